pub type Epoch = u64; // epoch number
pub type Slot = u64; // slot number
pub type ValidatorIndex = u64; // validator registry index
