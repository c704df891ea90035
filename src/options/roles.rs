//! Built-in role tables.
//!
//! A role names the units a node of that type is expected to run, along
//! with the process name each unit shows up as. The tables cover the
//! stock contrail node types; a config file can extend or override them
//! through `[process_names]`.

/// One role and its unit table.
pub(crate) struct RoleTable {
    pub(crate) name: &'static str,
    /// Pairs of unit name and the process name it runs as.
    pub(crate) units: &'static [(&'static str, &'static str)],
}

/// Every built-in role. Keep the `--role` value parser in the args
/// module in sync with the names here.
pub(crate) const ROLE_TABLES: &[RoleTable] = &[
    RoleTable {
        name: "analytics",
        units: &[
            ("contrail-collector", "contrail-collector"),
            ("contrail-analytics-api", "contrail-analytics-api"),
            ("contrail-analytics-nodemgr", "contrail-nodemgr"),
        ],
    },
    RoleTable {
        name: "analytics-alarm",
        units: &[
            ("contrail-alarm-gen", "contrail-alarm-gen"),
            ("kafka", "kafka"),
            ("contrail-analytics-alarm-nodemgr", "contrail-nodemgr"),
        ],
    },
    RoleTable {
        name: "analytics-snmp",
        units: &[
            ("contrail-snmp-collector", "contrail-snmp-collector"),
            ("contrail-topology", "contrail-topology"),
            ("contrail-analytics-snmp-nodemgr", "contrail-nodemgr"),
        ],
    },
    RoleTable {
        name: "compute",
        units: &[
            ("contrail-vrouter-agent", "contrail-vrouter-agent"),
            ("contrail-vrouter-nodemgr", "contrail-nodemgr"),
        ],
    },
    RoleTable {
        name: "config",
        units: &[
            ("contrail-api", "contrail-api"),
            ("contrail-schema", "contrail-schema"),
            ("contrail-svc-monitor", "contrail-svc-monitor"),
            ("contrail-device-manager", "contrail-device-manager"),
            ("contrail-config-nodemgr", "contrail-nodemgr"),
        ],
    },
    RoleTable {
        name: "config-database",
        units: &[
            ("cassandra", "cassandra"),
            ("contrail-config-database-nodemgr", "contrail-nodemgr"),
        ],
    },
    RoleTable {
        name: "control",
        units: &[
            ("contrail-control", "contrail-control"),
            ("contrail-dns", "contrail-dns"),
            ("contrail-named", "contrail-named"),
            ("contrail-control-nodemgr", "contrail-nodemgr"),
        ],
    },
    RoleTable {
        name: "database",
        units: &[
            ("contrail-query-engine", "contrail-query-engine"),
            ("cassandra", "cassandra"),
            ("contrail-database-nodemgr", "contrail-nodemgr"),
        ],
    },
];

/// Looks a built-in role up by name.
pub(crate) fn builtin(name: &str) -> Option<&'static RoleTable> {
    ROLE_TABLES.iter().find(|table| table.name == name)
}
