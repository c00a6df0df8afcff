//! Process exit codes.
//! Library failures map through `PrecacheError::exit_code`; anything else is internal.

use precache::PrecacheError;

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 2; // Bad arguments, I/O on stdout, unexpected failures

pub fn for_error(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PrecacheError>()
        .map(PrecacheError::exit_code)
        .unwrap_or(INTERNAL_ERROR)
}
