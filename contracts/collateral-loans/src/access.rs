use soroban_sdk::{Address, Env};

use crate::error::Error;
use crate::storage::read_owner;

pub enum Role {
    Owner,
}

/// Authenticates `caller` and checks it holds `role`.
pub fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), Error> {
    caller.require_auth();
    match role {
        Role::Owner => {
            if *caller != read_owner(env)? {
                return Err(Error::Unauthorized);
            }
        }
    }
    Ok(())
}
