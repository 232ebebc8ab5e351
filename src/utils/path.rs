//! ## path
//!
//! Remote address building

use std::path::Path;

/// URI scheme prepended to every remote address
pub const SMB_SCHEME: &str = "smb://";

/// Build the canonical address for `path` inside the share.
///
/// Pure function: `smb://host/share`, then the share-relative path with
/// leading and trailing separators stripped and interior runs of
/// separators collapsed. An odd input yields a well-formed address for
/// a path that simply does not exist remotely.
pub fn build_address<P: AsRef<Path>>(host: &str, share: &str, path: P) -> String {
    let mut address = format!("{}{}/{}", SMB_SCHEME, host, share.trim_matches('/'));
    let relative = path.as_ref().to_string_lossy();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        address.push('/');
        address.push_str(segment);
    }
    address
}
