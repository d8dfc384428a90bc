//! Owner reconfiguration of a reserve at the host's current time.

use crate::errors::LendingResult;
use crate::handlers::{rejected, Host};
use crate::state::{Market, ReserveSnapshot};
use crate::types::{Address, ReserveConfig, ReserveId};

/// Replace the configuration of reserve `id`
///
/// Interest up to now accrues under the old rate curve; the new curve
/// applies from this timestamp on.
pub fn update_reserve_config(
    market: &mut Market,
    caller: &Address,
    id: ReserveId,
    config: ReserveConfig,
    host: &Host<'_>,
) -> LendingResult<ReserveSnapshot> {
    let now = host.clock.unix_timestamp();
    market
        .update_reserve_config(caller, id, config, now)
        .map_err(|err| rejected("update_reserve_config", err))?;
    market.reserve(id)?.snapshot()
}
