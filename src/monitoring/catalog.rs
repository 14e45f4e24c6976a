//! Metric family catalog
//!
//! All families exported by the console are declared here once; the sink
//! registers them up front and everything else refers to them by name.

/// Label carrying the [`ErrorCategory`](crate::classify::ErrorCategory)
pub const ERROR_REASON: &str = "error_reason";

pub const ERRORS_TOTAL: &str = "health_check_errors_total";
pub const DURATION_SECONDS: &str = "health_check_duration_seconds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyKind {
    Gauge,
    Counter,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: FamilyKind,
    pub labels: &'static [&'static str],
}

/// One probe family: which gauge it drives and its `collector` label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeKind {
    pub gauge: &'static str,
    pub collector: &'static str,
}

impl ProbeKind {
    pub const DATABASE: ProbeKind = ProbeKind {
        gauge: "mysql_up",
        collector: "database",
    };
    pub const APISERVER: ProbeKind = ProbeKind {
        gauge: "kubernetes_apiserver_up",
        collector: "kubernetes_apiserver",
    };
    pub const DNS: ProbeKind = ProbeKind {
        gauge: "coredns_up",
        collector: "coredns",
    };
    pub const ETCD: ProbeKind = ProbeKind {
        gauge: "etcd_up",
        collector: "etcd",
    };
    pub const STORAGE: ProbeKind = ProbeKind {
        gauge: "cluster_storage_up",
        collector: "storage_class",
    };
    pub const REGISTRY: ProbeKind = ProbeKind {
        gauge: "registry_up",
        collector: "registry",
    };
    pub const OBJECT_STORE: ProbeKind = ProbeKind {
        gauge: "minio_up",
        collector: "minio",
    };

    pub const ALL: [ProbeKind; 7] = [
        Self::DATABASE,
        Self::APISERVER,
        Self::DNS,
        Self::ETCD,
        Self::STORAGE,
        Self::REGISTRY,
        Self::OBJECT_STORE,
    ];
}

const fn gauge(
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
) -> MetricFamily {
    MetricFamily {
        name,
        help,
        kind: FamilyKind::Gauge,
        labels,
    }
}

pub static FAMILIES: &[MetricFamily] = &[
    gauge(
        "mysql_up",
        "Whether the MySQL instance is reachable (1 = up, 0 = down)",
        &["instance", "host", "port", ERROR_REASON],
    ),
    gauge(
        "kubernetes_apiserver_up",
        "Whether the Kubernetes API server is reachable (1 = up, 0 = down)",
        &[ERROR_REASON],
    ),
    gauge(
        "coredns_up",
        "Whether cluster DNS resolves service names (1 = up, 0 = down)",
        &[ERROR_REASON],
    ),
    gauge(
        "etcd_up",
        "Whether etcd is running (1 = up, 0 = down)",
        &[ERROR_REASON],
    ),
    gauge(
        "cluster_storage_up",
        "Whether the storage class can provision a volume (1 = up, 0 = down)",
        &["storage_class", ERROR_REASON],
    ),
    gauge(
        "registry_up",
        "Whether the image registry answers the v2 API (1 = up, 0 = down)",
        &["instance", "url", ERROR_REASON],
    ),
    gauge(
        "minio_up",
        "Whether the object store answers ListBuckets (1 = up, 0 = down)",
        &[ERROR_REASON],
    ),
    MetricFamily {
        name: ERRORS_TOTAL,
        help: "Total number of failed health checks",
        kind: FamilyKind::Counter,
        labels: &["collector", "error_type"],
    },
    MetricFamily {
        name: DURATION_SECONDS,
        help: "Duration of health checks in seconds",
        kind: FamilyKind::Histogram,
        labels: &["collector"],
    },
];

pub fn family(name: &str) -> Option<&'static MetricFamily> {
    FAMILIES.iter().find(|f| f.name == name)
}
