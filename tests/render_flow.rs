use anyhow::Result;
use async_trait::async_trait;
use manifestctl::api::{ApiError, ServiceCatalog};
use manifestctl::flows::{RenderConfig, Renderer};
use manifestctl::logic::defaults::ManifestDefaults;
use manifestctl::models::{ConfigMap, Deployment, HorizontalPodAutoscaler, Ingress, Secret, Service, ServiceRecord};
use pretty_assertions::assert_eq;
use serde_yaml::Value;
use std::collections::HashMap;

/// Catalog answering from canned JSON bodies, decoded the way the HTTP
/// client decodes them.
struct StaticCatalog {
    listing: serde_json::Value,
    records: HashMap<String, serde_json::Value>,
}

#[async_trait]
impl ServiceCatalog for StaticCatalog {
    async fn list_service_names(&self) -> Result<Vec<String>, ApiError> {
        Ok(manifestctl::logic::parsing::service_names(&self.listing))
    }

    async fn find_service(&self, name: &str) -> Result<Option<ServiceRecord>, ApiError> {
        Ok(self
            .records
            .get(name)
            .map(|v| serde_json::from_value(v.clone()).expect("fixture record")))
    }
}

async fn render(catalog: StaticCatalog, service: Option<&str>) -> Result<String> {
    let config = RenderConfig::new(service.map(str::to_string), ManifestDefaults::default());
    let mut out = Vec::new();
    Renderer::new(catalog, config).render(&mut out).await?;
    Ok(String::from_utf8(out)?)
}

fn documents(text: &str) -> Vec<&str> {
    text.split("---\n").filter(|d| !d.trim().is_empty()).collect()
}

#[tokio::test]
async fn test_bare_record_renders_seven_default_manifests() -> Result<()> {
    let catalog = StaticCatalog {
        listing: serde_json::json!({ "items": [{ "service_name": "orders" }] }),
        records: HashMap::from([("orders".to_string(), serde_json::json!({ "name": "orders" }))]),
    };
    let text = render(catalog, None).await?;
    let docs = documents(&text);

    let kinds: Vec<String> = docs
        .iter()
        .map(|d| serde_yaml::from_str::<Value>(d).unwrap()["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["Namespace", "ConfigMap", "Secret", "Deployment", "Service", "HorizontalPodAutoscaler", "Ingress"]
    );

    let ns: Value = serde_yaml::from_str(docs[0])?;
    assert_eq!(ns["apiVersion"], "v1");
    assert_eq!(ns["metadata"]["name"], "orders");

    let cm: ConfigMap = serde_yaml::from_str(docs[1])?;
    assert_eq!(cm.metadata.name, "orders-config");
    assert_eq!(cm.metadata.namespace.as_deref(), Some("orders"));
    assert!(cm.data.is_empty());

    let secret: Secret = serde_yaml::from_str(docs[2])?;
    assert_eq!(secret.metadata.name, "orders-secret");
    assert_eq!(secret.secret_type, "Opaque");

    let dep: Deployment = serde_yaml::from_str(docs[3])?;
    let container = &dep.spec.template.spec.containers[0];
    assert_eq!(dep.metadata.name, "orders");
    assert_eq!(dep.spec.replicas, 3);
    assert_eq!(container.image, "registry.local/orders:latest");
    assert_eq!(container.ports[0].container_port, 5001);
    assert_eq!(container.resources.requests.cpu, "100m");
    assert_eq!(container.resources.requests.memory, "128Mi");
    assert_eq!(container.resources.limits.cpu, "500m");
    assert_eq!(container.resources.limits.memory, "512Mi");

    let svc: Service = serde_yaml::from_str(docs[4])?;
    assert_eq!(svc.spec.service_type, "ClusterIP");
    assert_eq!(svc.spec.ports[0].port, 5001);

    let hpa: HorizontalPodAutoscaler = serde_yaml::from_str(docs[5])?;
    assert_eq!(hpa.spec.scale_target_ref.name, "orders");
    assert_eq!((hpa.spec.min_replicas, hpa.spec.max_replicas), (2, 10));
    assert_eq!(hpa.spec.metrics[0].resource.target.average_utilization, 70);

    let ing: Ingress = serde_yaml::from_str(docs[6])?;
    assert_eq!(ing.spec.rules[0].host, "orders.local");
    assert_eq!(ing.spec.rules[0].http.paths[0].path, "/");
    Ok(())
}

#[tokio::test]
async fn test_service_manifest_for_orders_port_7000() -> Result<()> {
    let catalog = StaticCatalog {
        listing: serde_json::json!([]),
        records: HashMap::from([(
            "orders".to_string(),
            serde_json::json!({ "name": "orders", "port": 7000 }),
        )]),
    };
    let text = render(catalog, Some("orders")).await?;
    let docs = documents(&text);

    let svc: Service = serde_yaml::from_str(docs[4])?;
    assert_eq!(svc.metadata.name, "orders-service");
    assert_eq!(svc.spec.ports[0].port, 7000);
    assert_eq!(svc.spec.ports[0].target_port, 7000);
    assert_eq!(
        svc.spec.selector,
        std::collections::BTreeMap::from([("app".to_string(), "orders".to_string())])
    );

    let dep: Deployment = serde_yaml::from_str(docs[3])?;
    let cm: ConfigMap = serde_yaml::from_str(docs[1])?;
    assert_eq!(dep.spec.template.spec.containers[0].env_from[0].config_map_ref.name, cm.metadata.name);
    assert_eq!(svc.spec.selector, dep.spec.template.metadata.labels);

    let ing: Ingress = serde_yaml::from_str(docs[6])?;
    let backend = &ing.spec.rules[0].http.paths[0].backend.service;
    assert_eq!(backend.name, svc.metadata.name);
    assert_eq!(backend.port.number, 7000);
    Ok(())
}

#[tokio::test]
async fn test_empty_catalog_renders_empty_list() -> Result<()> {
    let catalog = StaticCatalog {
        listing: serde_json::json!({ "items": [] }),
        records: HashMap::new(),
    };
    let text = render(catalog, None).await?;
    let list: Value = serde_yaml::from_str(&text)?;
    assert_eq!(list["kind"], "List");
    assert_eq!(list["items"].as_sequence().map(|s| s.len()), Some(0));
    assert!(!text.contains("---"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_services_are_skipped() -> Result<()> {
    let catalog = StaticCatalog {
        listing: serde_json::json!([{ "name": "ghost" }, { "name": "orders" }, { "name": "phantom" }]),
        records: HashMap::from([("orders".to_string(), serde_json::json!({ "name": "orders" }))]),
    };
    let text = render(catalog, None).await?;
    assert_eq!(documents(&text).len(), 7);
    Ok(())
}
