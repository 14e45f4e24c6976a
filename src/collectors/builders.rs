//! One constructor per backend family
//!
//! Each returns `None` when the family has nothing configured.

use super::{Collector, ProbeSource, StaticProbes};
use crate::config::ConsoleConfig;
use crate::monitoring::ProbeMetrics;
use crate::probes::cluster::{
    ApiServerProbe, ClusterApi, DnsProbe, EtcdProbe, KubeClient, ProvisioningApi, Resolver,
    StorageClassSource, SystemResolver,
};
use crate::probes::database::{DatabaseConnector, DatabaseProbe, SeaOrmConnector};
use crate::probes::object_store::ObjectStoreProbe;
use crate::probes::registry::RegistryProbe;
use crate::probes::Probe;
use crate::utils::error::Result;
use std::sync::Arc;

pub fn database_collector(config: &ConsoleConfig, metrics: Arc<ProbeMetrics>) -> Option<Collector> {
    database_collector_with(config, metrics, Arc::new(SeaOrmConnector))
}

pub fn database_collector_with(
    config: &ConsoleConfig,
    metrics: Arc<ProbeMetrics>,
    connector: Arc<dyn DatabaseConnector>,
) -> Option<Collector> {
    let probes = config
        .databases
        .iter()
        .map(|instance| {
            Arc::new(DatabaseProbe::new(instance.clone(), connector.clone())) as Arc<dyn Probe>
        })
        .collect();
    fixed("database", probes, config, metrics)
}

pub fn registry_collector(config: &ConsoleConfig, metrics: Arc<ProbeMetrics>) -> Option<Collector> {
    let probes = config
        .registries
        .iter()
        .map(|instance| Arc::new(RegistryProbe::new(instance.clone())) as Arc<dyn Probe>)
        .collect();
    fixed("registry", probes, config, metrics)
}

/// Skipped unless an endpoint is configured
pub fn object_store_collector(
    config: &ConsoleConfig,
    metrics: Arc<ProbeMetrics>,
) -> Option<Collector> {
    if !config.object_store.is_configured() {
        return None;
    }
    let probe: Arc<dyn Probe> = Arc::new(ObjectStoreProbe::new(&config.object_store));
    fixed("minio", vec![probe], config, metrics)
}

/// API server, DNS, etcd and storage classes over one cluster client
///
/// Fails when the client cannot be built; `Ok(None)` when disabled.
pub fn cluster_collector(
    config: &ConsoleConfig,
    metrics: Arc<ProbeMetrics>,
) -> Result<Option<Collector>> {
    if !config.cluster.enabled {
        return Ok(None);
    }

    let client = Arc::new(KubeClient::from_config(&config.cluster)?);
    Ok(Some(cluster_collector_with(
        config,
        metrics,
        client.clone(),
        client,
        Arc::new(SystemResolver),
    )))
}

pub fn cluster_collector_with(
    config: &ConsoleConfig,
    metrics: Arc<ProbeMetrics>,
    api: Arc<dyn ClusterApi>,
    provisioning: Arc<dyn ProvisioningApi>,
    resolver: Arc<dyn Resolver>,
) -> Collector {
    let cluster = &config.cluster;
    let reachability: Vec<Arc<dyn Probe>> = vec![
        Arc::new(ApiServerProbe::new(api.clone())),
        Arc::new(DnsProbe::new(api.clone(), resolver, cluster.dns_name.clone())),
        Arc::new(EtcdProbe::new(api.clone())),
    ];
    let sources: Vec<Arc<dyn ProbeSource>> = vec![
        Arc::new(StaticProbes::new(reachability)),
        Arc::new(StorageClassSource::new(
            api,
            provisioning,
            cluster.provisioning.clone(),
        )),
    ];

    Collector::new("cluster", sources, metrics, config.collect_interval)
}

fn fixed(
    name: &'static str,
    probes: Vec<Arc<dyn Probe>>,
    config: &ConsoleConfig,
    metrics: Arc<ProbeMetrics>,
) -> Option<Collector> {
    let source = StaticProbes::new(probes);
    if source.is_empty() {
        return None;
    }
    Some(Collector::new(
        name,
        vec![Arc::new(source) as Arc<dyn ProbeSource>],
        metrics,
        config.collect_interval,
    ))
}
