//! Binding descriptions for the host runtime.
//!
//! Two renderings of a [`Registry`]: a serde [`Manifest`] for tooling, and
//! the external-call table the host runtime reads to map operation names
//! onto exported symbols:
//!
//! ```text
//! /usr/local/lib/libmposix_ffi.so
//! clockgettime: gtm_status_t posix_clock_gettime(I:gtm_char_t*, O:gtm_long_t*, O:gtm_long_t*)
//! ```

use serde::Serialize;

use crate::error::HostResult;
use crate::registry::{Category, Direction, Kind, Registry};

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub operations: Vec<OperationEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationEntry {
    pub name: String,
    pub symbol: String,
    pub arity: usize,
    pub category: Category,
    pub returns: String,
    pub params: Vec<ParamEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamEntry {
    pub name: String,
    pub direction: Direction,
    pub c_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl Manifest {
    pub fn from_registry(registry: &Registry) -> Self {
        let operations = registry
            .iter()
            .map(|binding| OperationEntry {
                name: binding.name.to_string(),
                symbol: binding.symbol.to_string(),
                arity: binding.arity(),
                category: binding.category,
                returns: binding.return_type().to_string(),
                params: binding
                    .params
                    .iter()
                    .map(|param| ParamEntry {
                        name: param.name.to_string(),
                        direction: param.direction,
                        c_type: param.kind.c_type().to_string(),
                        capacity: match param.kind {
                            Kind::Buffer(capacity) => Some(capacity),
                            _ => None,
                        },
                    })
                    .collect(),
            })
            .collect();
        Self { operations }
    }

    pub fn to_json(&self) -> HostResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render the external-call table for the library at `library`.
pub fn render_call_table(registry: &Registry, library: &str) -> String {
    let mut table = String::from(library);
    table.push('\n');
    for binding in registry.iter() {
        let params: Vec<String> = binding.params.iter().map(|p| p.declaration()).collect();
        table.push_str(&format!(
            "{}: {} {}({})\n",
            binding.table_name(),
            binding.return_type(),
            binding.symbol,
            params.join(", ")
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_table_lists_every_binding() {
        let registry = Registry::standard();
        let table = render_call_table(&registry, "/opt/mposix/libmposix_ffi.so");
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("/opt/mposix/libmposix_ffi.so"));
        assert_eq!(lines.count(), registry.len());
    }

    #[test]
    fn call_table_entries() {
        let table = render_call_table(&Registry::standard(), "lib.so");
        assert!(table.contains(
            "clockgettime: gtm_status_t posix_clock_gettime(I:gtm_char_t*, O:gtm_long_t*, O:gtm_long_t*)\n"
        ));
        assert!(table.contains("time: gtm_long_t posix_time()\n"));
        assert!(table.contains("closelog: void posix_closelog()\n"));
        assert!(table.contains("umask: gtm_ulong_t posix_umask(I:gtm_ulong_t)\n"));
        assert!(table.contains(
            "readdir: gtm_status_t posix_readdir(I:gtm_ulong_t, O:gtm_char_t*[256])\n"
        ));
        assert!(table.contains("mktime: gtm_long_t posix_mktime(I:gtm_int_t*,"));
    }

    #[test]
    fn manifest_json_carries_capacities() {
        let manifest = Manifest::from_registry(&Registry::standard());
        let json = manifest.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let uname = value["operations"]
            .as_array()
            .unwrap()
            .iter()
            .find(|op| op["name"] == "uname")
            .unwrap();
        assert_eq!(uname["arity"], 5);
        assert_eq!(uname["category"], "status");
        assert_eq!(uname["params"][0]["capacity"], 128);
        assert_eq!(uname["params"][0]["direction"], "out");
    }
}
