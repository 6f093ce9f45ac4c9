//! The host clock, read from the cosmwasm block environment.

use cosmwasm_std::Env;
use tm_light_client::types::Timestamp;

use crate::HostError;

/// Current block time, used for expiry and clock drift checks
/// # Errors
/// Returns a decoding error if the block time lies past year 9999
pub fn host_timestamp(env: &Env) -> Result<Timestamp, HostError> {
    Ok(Timestamp::from_unix_nanos(i128::from(env.block.time.nanos()))?)
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::testing::mock_env;

    use super::*;

    #[test]
    fn block_time_keeps_nanoseconds() {
        let mut env = mock_env();
        env.block.time = cosmwasm_std::Timestamp::from_nanos(1_700_000_000_000_000_123);

        let now = host_timestamp(&env).unwrap();
        assert_eq!(now.unix_seconds(), 1_700_000_000);
        assert_eq!(now.subsec_nanos(), 123);
    }

    #[test]
    fn latest_block_time_is_representable() {
        let mut env = mock_env();
        env.block.time = cosmwasm_std::Timestamp::from_nanos(u64::MAX);
        assert_eq!(
            host_timestamp(&env).unwrap().unix_nanos(),
            i128::from(u64::MAX)
        );
    }
}
