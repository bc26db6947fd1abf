use std::collections::BTreeMap;

use crate::models::{Labels, ServiceRecord};

/// Fallback values for every optional field of a [`ServiceRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDefaults {
    pub port: u32,
    pub replicas: u32,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,
    pub secret_type: String,
    pub service_type: String,
    pub target_cpu_utilization: u32,
    pub ingress_path: String,
    /// Registry prefix for the default image, `<registry>/<service>:latest`.
    pub image_registry: String,
}

impl Default for ManifestDefaults {
    fn default() -> Self {
        Self {
            port: 5001,
            replicas: 3,
            min_replicas: 2,
            max_replicas: 10,
            cpu_request: "100m".to_string(),
            memory_request: "128Mi".to_string(),
            cpu_limit: "500m".to_string(),
            memory_limit: "512Mi".to_string(),
            secret_type: "Opaque".to_string(),
            service_type: "ClusterIP".to_string(),
            target_cpu_utilization: 70,
            ingress_path: "/".to_string(),
            image_registry: "registry.local".to_string(),
        }
    }
}

impl ManifestDefaults {
    pub fn with_registry(registry: &str) -> Self {
        Self {
            image_registry: registry.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn image_for(&self, service: &str) -> String {
        format!("{}/{}:latest", self.image_registry, service)
    }
}

/// A service with every field populated. Built only by [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedService {
    pub name: String,
    pub namespace: String,
    pub namespace_labels: Labels,
    pub port: u32,
    pub pod_labels: Labels,
    pub configmap: ResolvedConfigMap,
    pub secret: ResolvedSecret,
    pub deployment: ResolvedDeployment,
    pub service: ResolvedK8sService,
    pub hpa: ResolvedHpa,
    pub ingress: ResolvedIngress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfigMap {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSecret {
    pub name: String,
    pub secret_type: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDeployment {
    pub name: String,
    pub image: String,
    pub container_port: u32,
    pub replicas: u32,
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedK8sService {
    pub name: String,
    pub service_type: String,
    pub target_port: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHpa {
    pub name: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub target_cpu_utilization: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIngress {
    pub name: String,
    pub host: String,
    pub path: String,
}

/// Fill every absent field of `record` from `defaults`.
///
/// Pure and total: no field's absence is an error, and the record is only
/// borrowed.
pub fn resolve(record: &ServiceRecord, defaults: &ManifestDefaults) -> ResolvedService {
    let svc = record.name.as_str();
    let port = record.port.unwrap_or(defaults.port);

    let namespace = record.namespace.clone().unwrap_or_else(|| svc.to_string());
    let namespace_labels = record
        .namespace_info
        .as_ref()
        .and_then(|n| n.labels.clone())
        .unwrap_or_default();

    let cm = record.configmap.clone().unwrap_or_default();
    let configmap = ResolvedConfigMap {
        name: cm.name.unwrap_or_else(|| format!("{}-config", svc)),
        data: cm.data.unwrap_or_default(),
    };

    let sec = record.secret.clone().unwrap_or_default();
    let secret = ResolvedSecret {
        name: sec.name.unwrap_or_else(|| format!("{}-secret", svc)),
        secret_type: sec.secret_type.unwrap_or_else(|| defaults.secret_type.clone()),
        data: sec.data.unwrap_or_default(),
    };

    let dep = record.deployment.clone().unwrap_or_default();
    let deployment = ResolvedDeployment {
        name: dep.name.unwrap_or_else(|| svc.to_string()),
        image: dep.image.unwrap_or_else(|| defaults.image_for(svc)),
        container_port: dep.target_port.unwrap_or(port),
        replicas: record.replicas.unwrap_or(defaults.replicas),
        cpu_request: record.cpu_request.clone().unwrap_or_else(|| defaults.cpu_request.clone()),
        memory_request: record
            .memory_request
            .clone()
            .unwrap_or_else(|| defaults.memory_request.clone()),
        cpu_limit: record.cpu_limit.clone().unwrap_or_else(|| defaults.cpu_limit.clone()),
        memory_limit: record
            .memory_limit
            .clone()
            .unwrap_or_else(|| defaults.memory_limit.clone()),
    };

    let ks = record.k8s_service.clone().unwrap_or_default();
    let service = ResolvedK8sService {
        name: ks.name.unwrap_or_else(|| format!("{}-service", svc)),
        service_type: ks.service_type.unwrap_or_else(|| defaults.service_type.clone()),
        target_port: ks.target_port.unwrap_or(port),
    };

    let h = record.hpa.clone().unwrap_or_default();
    let hpa = ResolvedHpa {
        name: h.name.unwrap_or_else(|| format!("{}-hpa", svc)),
        min_replicas: record.min_replicas.unwrap_or(defaults.min_replicas),
        max_replicas: record.max_replicas.unwrap_or(defaults.max_replicas),
        target_cpu_utilization: h
            .target_cpu_utilization
            .unwrap_or(defaults.target_cpu_utilization),
    };

    let ing = record.ingress.clone().unwrap_or_default();
    let ingress = ResolvedIngress {
        name: ing.name.unwrap_or_else(|| format!("{}-ingress", svc)),
        host: ing.host.unwrap_or_else(|| format!("{}.local", svc)),
        path: ing.path.unwrap_or_else(|| defaults.ingress_path.clone()),
    };

    ResolvedService {
        name: svc.to_string(),
        namespace,
        namespace_labels,
        port,
        pod_labels: Labels::from([("app".to_string(), svc.to_string())]),
        configmap,
        secret,
        deployment,
        service,
        hpa,
        ingress,
    }
}
