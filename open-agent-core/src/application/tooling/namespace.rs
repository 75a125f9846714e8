//! `server__tool` naming.

use crate::constants::NAMESPACE_SEPARATOR;

pub fn qualify(server: &str, tool: &str) -> String {
    format!("{server}{NAMESPACE_SEPARATOR}{tool}")
}

/// Split a namespaced name at the first separator into `(server, tool)`.
pub fn split(namespaced: &str) -> Option<(&str, &str)> {
    let (server, tool) = namespaced.split_once(NAMESPACE_SEPARATOR)?;
    if server.is_empty() || tool.is_empty() {
        return None;
    }
    Some((server, tool))
}

/// Bare tool names must not contain the separator or start with `_`, otherwise
/// splitting at the first separator is ambiguous.
pub fn is_valid_bare_name(tool: &str) -> bool {
    !tool.is_empty() && !tool.contains(NAMESPACE_SEPARATOR) && !tool.starts_with('_')
}

/// Server names must not contain the separator or end with `_`; `notion_` would
/// qualify to `notion___search` and split back as `("notion", "_search")`.
pub fn is_valid_server_name(server: &str) -> bool {
    !server.trim().is_empty() && !server.contains(NAMESPACE_SEPARATOR) && !server.ends_with('_')
}
