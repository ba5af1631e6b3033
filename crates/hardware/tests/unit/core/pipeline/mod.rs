/// Fetch, Decode and Execute redirects: prediction, misprediction, `fence.i`.
pub mod branches;
