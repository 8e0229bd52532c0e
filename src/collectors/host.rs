//! Host identity: name, uptime, OS and platform (distribution).

use super::{CollectError, HostIdentity};
use sysinfo::System;

pub(super) fn identity() -> Result<HostIdentity, CollectError> {
    let hostname = System::host_name().ok_or(CollectError::Unavailable("hostname"))?;
    Ok(HostIdentity {
        hostname,
        uptime_secs: System::uptime(),
        os: std::env::consts::OS.to_string(),
        platform: System::distribution_id(),
    })
}
