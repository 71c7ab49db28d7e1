use log::warn;

/// nominal depth of the CHIP-8 call stack; not enforced
pub const STACK_DEPTH: usize = 16;

/// Return addresses, indexed by the stack pointer. Slot 0 is never written by
/// CALL, since it bumps SP before storing.
#[derive(Debug, Default, Clone)]
pub struct Stack {
    slots: Vec<Option<u16>>,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            slots: Vec::with_capacity(STACK_DEPTH + 1),
        }
    }

    pub fn store(&mut self, sp: u8, addr: u16) {
        let idx = sp as usize;
        if idx > STACK_DEPTH {
            warn!("stack pointer {} is past the nominal depth of {}", sp, STACK_DEPTH);
        }
        if self.slots.len() <= idx {
            self.slots.resize(idx + 1, None);
        }
        self.slots[idx] = Some(addr);
    }

    /// the address at `sp`; a slot that was never written reads as 0
    pub fn load(&self, sp: u8) -> u16 {
        self.get(sp).unwrap_or_else(|| {
            warn!("return through unset stack slot {}; using address 0", sp);
            0
        })
    }

    pub fn get(&self, sp: u8) -> Option<u16> {
        self.slots.get(sp as usize).copied().flatten()
    }
}
