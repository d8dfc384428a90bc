//! Market operation halt flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Independent halt switches consulted before any other validation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MarketFlags: u64 {
        const HALT_BORROWS     = 0b0001;
        const HALT_REPAYS      = 0b0010;
        const HALT_DEPOSITS    = 0b0100;
        const HALT_WITHDRAWALS = 0b1000;
    }
}

impl MarketFlags {
    pub fn halts_deposits(&self) -> bool {
        self.contains(MarketFlags::HALT_DEPOSITS)
    }

    pub fn halts_borrows(&self) -> bool {
        self.contains(MarketFlags::HALT_BORROWS)
    }

    pub fn halts_repays(&self) -> bool {
        self.contains(MarketFlags::HALT_REPAYS)
    }

    pub fn halts_withdrawals(&self) -> bool {
        self.contains(MarketFlags::HALT_WITHDRAWALS)
    }
}
