/// Which opcodes `step()` will dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// only 00E0, 00EE, 1nnn, 2nnn, 3xkk, 4xkk, 5xy0 and 9xy0; anything else
    /// is logged and skipped
    Reference,
    /// the reference table plus the loads and sprite draw the machine already
    /// has handlers for: 6xkk, 8xy0, Annn and Dxyn
    #[default]
    Extended,
}

/// What to do with writes into the interpreter's own memory (below 0x200)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryPolicy {
    /// log it and carry on with the write
    #[default]
    Permissive,
    /// refuse it, leaving memory untouched
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterpreterConfig {
    pub dispatch: DispatchMode,
    pub memory_policy: MemoryPolicy,
}

impl InterpreterConfig {
    /// reproduces the reference machine as closely as possible
    pub fn reference() -> Self {
        InterpreterConfig {
            dispatch: DispatchMode::Reference,
            memory_policy: MemoryPolicy::Permissive,
        }
    }
}
