use std::fmt;

/// A program counter: an index into a [`crate::Program`]'s instruction list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pc(u32);

impl Pc {
    pub fn new(index: usize) -> Self {
        Pc(index as u32)
    }

    /// This PC's position in the instruction list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for Pc {
    fn from(index: usize) -> Self {
        Pc::new(index)
    }
}

impl From<Pc> for usize {
    fn from(pc: Pc) -> Self {
        pc.index()
    }
}

impl fmt::Display for Pc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
