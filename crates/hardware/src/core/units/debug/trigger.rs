//! Match triggers.
//!
//! A bank of type-2 (match control) triggers, selected through `tselect`:
//! 1. **Configuration:** `tdata1` holds the match control bits, `tdata2` the compare value.
//! 2. **Matching:** Execute compares the pc, the effective address or the store data.
//! 3. **Actions:** A match raises a breakpoint exception, or enters debug mode when the
//!    trigger is owned by the debugger (`dmode`).

/// `tdata1.type` value for an address/data match trigger.
pub const TYPE_MATCH: u32 = 2 << 28;
/// Trigger can only be written from debug mode.
pub const DMODE: u32 = 1 << 27;
/// Set by hardware when the trigger fires.
pub const HIT: u32 = 1 << 20;
/// Compare against store data instead of the address.
pub const SELECT: u32 = 1 << 19;
/// Shift of the action field.
pub const ACTION_SHIFT: u32 = 12;
/// Mask of the action field (after shifting).
pub const ACTION_MASK: u32 = 0xF;
/// Shift of the match field.
pub const MATCH_SHIFT: u32 = 7;
/// Mask of the match field (after shifting).
pub const MATCH_MASK: u32 = 0xF;
/// Trigger is enabled in M-mode.
pub const M: u32 = 1 << 6;
/// Match on instruction execution.
pub const EXECUTE: u32 = 1 << 2;
/// Match on stores.
pub const STORE: u32 = 1 << 1;
/// Match on loads.
pub const LOAD: u32 = 1 << 0;

const WRITE_MASK: u32 = DMODE | HIT | SELECT | (ACTION_MASK << ACTION_SHIFT) | M | EXECUTE | STORE | LOAD;

/// What a firing trigger does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerAction {
    /// Raise a breakpoint exception (action 0).
    Breakpoint,
    /// Enter debug mode (action 1).
    DebugMode,
}

/// A trigger that matched an instruction in Execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerHit {
    /// Index of the trigger.
    pub index: usize,
    /// Action requested by the trigger.
    pub action: TriggerAction,
}

/// One trigger's registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trigger {
    /// Match control.
    pub tdata1: u32,
    /// Compare value.
    pub tdata2: u32,
}

impl Default for Trigger {
    fn default() -> Self {
        Self {
            tdata1: TYPE_MATCH,
            tdata2: 0,
        }
    }
}

impl Trigger {
    const fn action(&self) -> TriggerAction {
        if (self.tdata1 >> ACTION_SHIFT) & ACTION_MASK == 1 {
            TriggerAction::DebugMode
        } else {
            TriggerAction::Breakpoint
        }
    }

    const fn armed(&self, kind: u32) -> bool {
        self.tdata1 & M != 0 && self.tdata1 & kind != 0
    }
}

/// Bank of match triggers.
#[derive(Clone, Debug)]
pub struct TriggerUnit {
    triggers: Vec<Trigger>,
    tselect: usize,
    debug_enabled: bool,
}

impl TriggerUnit {
    /// Creates `count` disabled triggers.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of triggers.
    /// * `debug_enabled` - Whether the debug unit exists (enables `dmode` and action 1).
    pub fn new(count: usize, debug_enabled: bool) -> Self {
        Self {
            triggers: vec![Trigger::default(); count.max(1)],
            tselect: 0,
            debug_enabled,
        }
    }

    /// All triggers, by index.
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Currently selected trigger index.
    pub const fn tselect(&self) -> u32 {
        self.tselect as u32
    }

    /// Selects a trigger; out-of-range indices are ignored.
    pub fn set_tselect(&mut self, val: u32) {
        if (val as usize) < self.triggers.len() {
            self.tselect = val as usize;
        }
    }

    /// `tdata1` of the selected trigger.
    pub fn tdata1(&self) -> u32 {
        self.triggers[self.tselect].tdata1
    }

    /// `tdata2` of the selected trigger.
    pub fn tdata2(&self) -> u32 {
        self.triggers[self.tselect].tdata2
    }

    /// Writes `tdata1` of the selected trigger with legalization.
    ///
    /// The type is fixed to 2 and the match mode to "equal". `dmode` sticks only
    /// for debugger writes with the debug unit present, and action 1 requires `dmode`.
    /// Instruction writes to a debugger-owned trigger are ignored.
    ///
    /// # Arguments
    ///
    /// * `val` - Value written.
    /// * `debugger` - `true` if the write comes from the debug interface.
    pub fn write_tdata1(&mut self, val: u32, debugger: bool) {
        let debug_enabled = self.debug_enabled;
        let trigger = &mut self.triggers[self.tselect];
        if trigger.tdata1 & DMODE != 0 && !debugger {
            return;
        }
        let mut val = val & WRITE_MASK;
        if !(debugger && debug_enabled) {
            val &= !DMODE;
        }
        let action = (val >> ACTION_SHIFT) & ACTION_MASK;
        if action != 0 && !(action == 1 && val & DMODE != 0) {
            val &= !(ACTION_MASK << ACTION_SHIFT);
        }
        trigger.tdata1 = TYPE_MATCH | val;
    }

    /// Writes `tdata2` of the selected trigger; instruction writes to a debugger-owned
    /// trigger are ignored.
    pub fn write_tdata2(&mut self, val: u32, debugger: bool) {
        let trigger = &mut self.triggers[self.tselect];
        if trigger.tdata1 & DMODE == 0 || debugger {
            trigger.tdata2 = val;
        }
    }

    fn first_match(&self, kind: u32, hit: impl Fn(&Trigger) -> bool) -> Option<TriggerHit> {
        self.triggers
            .iter()
            .enumerate()
            .find(|(_, t)| t.armed(kind) && hit(t))
            .map(|(index, t)| TriggerHit {
                index,
                action: t.action(),
            })
    }

    /// Checks the execute triggers against an instruction address.
    pub fn check_execute(&self, pc: u32) -> Option<TriggerHit> {
        self.first_match(EXECUTE, |t| t.tdata2 == pc)
    }

    /// Checks the load triggers against an effective address.
    pub fn check_load(&self, addr: u32) -> Option<TriggerHit> {
        self.first_match(LOAD, |t| t.tdata1 & SELECT == 0 && t.tdata2 == addr)
    }

    /// Checks the store triggers against an effective address or the store data.
    pub fn check_store(&self, addr: u32, data: u32) -> Option<TriggerHit> {
        self.first_match(STORE, |t| {
            let value = if t.tdata1 & SELECT != 0 { data } else { addr };
            t.tdata2 == value
        })
    }

    /// Sets the `hit` bit of a trigger that fired.
    pub fn set_hit(&mut self, index: usize) {
        if let Some(trigger) = self.triggers.get_mut(index) {
            trigger.tdata1 |= HIT;
        }
    }
}
