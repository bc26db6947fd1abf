use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::infra::fs::{read_yaml_document, write_json};
use crate::models::COLLECTION_FILES;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `<source_root>/services/<service>/k8s`
pub fn manifest_dir(source_root: &Path, service: &str) -> PathBuf {
    source_root.join("services").join(service).join("k8s")
}

/// Every service under `<source_root>/services` that has a `k8s` directory, sorted.
pub fn discover_services(source_root: &Path) -> Vec<String> {
    let services_dir = source_root.join("services");
    WalkDir::new(&services_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && e.path().join("k8s").is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect()
}

/// The parsed source manifests of one service. Only mapping-shaped
/// documents are kept; anything else counts as absent.
#[derive(Debug, Default, Clone)]
pub struct SourceManifests {
    pub namespace: Option<Value>,
    pub deployment: Option<Value>,
    pub service: Option<Value>,
    pub configmap: Option<Value>,
    pub hpa: Option<Value>,
    pub ingress: Option<Value>,
    pub ingress_gateway: Option<Value>,
    pub secret: Option<Value>,
    pub argocd_application: Option<Value>,
}

impl SourceManifests {
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<Option<Value>> {
            Ok(read_yaml_document(&dir.join(file))?.filter(Value::is_object))
        };

        Ok(Self {
            namespace: read("namespace.yaml")?,
            deployment: read("deployment.yaml")?,
            service: read("service.yaml")?,
            configmap: read("configmap.yaml")?,
            hpa: read("hpa.yaml")?,
            ingress: read("ingress.yaml")?,
            ingress_gateway: read("ingress-gateway.yaml")?,
            secret: read("secret.yaml")?,
            argocd_application: read("argocd-application.yaml")?,
        })
    }
}

fn field(doc: &Value, key: &str) -> Value {
    doc.get(key).cloned().unwrap_or_else(|| json!({}))
}

fn metadata_str<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get("metadata").and_then(|m| m.get(key)).and_then(Value::as_str)
}

/// Maps source manifests of one service onto the ten collection documents.
pub struct CollectionBuilder<'a> {
    service: &'a str,
    created: &'a str,
    sources: &'a SourceManifests,
}

impl<'a> CollectionBuilder<'a> {
    pub fn new(service: &'a str, created: &'a str, sources: &'a SourceManifests) -> Self {
        Self {
            service,
            created,
            sources,
        }
    }

    /// Namespace from namespace.yaml, else from the deployment, else the service name.
    pub fn namespace(&self) -> String {
        let inferred = match (&self.sources.namespace, &self.sources.deployment) {
            (Some(ns), _) => metadata_str(ns, "name"),
            (None, Some(dep)) => metadata_str(dep, "namespace"),
            (None, None) => None,
        };
        inferred.unwrap_or(self.service).to_string()
    }

    /// Documents for `collection`, in the shape each collection stores.
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        match collection {
            "services" => vec![self.service_doc()],
            "deployments" => self.deployments(),
            "k8s_services" => self.spec_doc(&self.sources.service, "service"),
            "configmaps" => self.configmaps(),
            "hpas" => self.spec_doc(&self.sources.hpa, "hpa"),
            "ingresses" => self.ingresses(),
            "namespaces" => self.namespaces(),
            "secrets" => self.secrets(),
            "argocd_applications" => self.argocd_applications(),
            "manifest_versions" => self.manifest_versions(),
            _ => vec![],
        }
    }

    fn id(&self, suffix: &str) -> String {
        format!("{}-{}", self.service, suffix)
    }

    fn service_doc(&self) -> Value {
        json!({
            "_id": self.service,
            "name": self.service,
            "namespace": self.namespace(),
            "status": "Unknown",
            "description": format!("Demo service {}", self.service),
            "created_at": self.created,
            "updated_at": self.created,
            "created_by": "portal",
            "tags": ["demo", "api", "flask"],
        })
    }

    fn deployments(&self) -> Vec<Value> {
        let Some(dep) = &self.sources.deployment else {
            return vec![];
        };
        let spec = field(dep, "spec");
        vec![json!({
            "_id": self.id("deployment"),
            "service_name": self.service,
            "metadata": field(dep, "metadata"),
            "spec": spec,
            "template": field(&spec, "template"),
            "version": 1,
            "created_at": self.created,
            "updated_at": self.created,
        })]
    }

    fn spec_doc(&self, source: &Option<Value>, suffix: &str) -> Vec<Value> {
        let Some(doc) = source else {
            return vec![];
        };
        vec![json!({
            "_id": self.id(suffix),
            "service_name": self.service,
            "metadata": field(doc, "metadata"),
            "spec": field(doc, "spec"),
            "version": 1,
            "created_at": self.created,
            "updated_at": self.created,
        })]
    }

    fn configmaps(&self) -> Vec<Value> {
        let Some(cm) = &self.sources.configmap else {
            return vec![];
        };
        vec![json!({
            "_id": self.id("config"),
            "service_name": self.service,
            "metadata": field(cm, "metadata"),
            "data": field(cm, "data"),
            "version": 1,
            "created_at": self.created,
            "updated_at": self.created,
        })]
    }

    fn ingresses(&self) -> Vec<Value> {
        [
            (&self.sources.ingress, "ingress"),
            (&self.sources.ingress_gateway, "gateway"),
        ]
        .into_iter()
        .filter_map(|(source, suffix)| {
            let doc = source.as_ref()?;
            let id = self.id(suffix);
            let ingress_name = metadata_str(doc, "name").map(str::to_string).unwrap_or_else(|| id.clone());
            Some(json!({
                "_id": id,
                "service_name": self.service,
                "ingress_name": ingress_name,
                "metadata": field(doc, "metadata"),
                "spec": field(doc, "spec"),
                "version": 1,
                "created_at": self.created,
                "updated_at": self.created,
            }))
        })
        .collect()
    }

    fn namespaces(&self) -> Vec<Value> {
        let Some(ns) = &self.sources.namespace else {
            return vec![];
        };
        vec![json!({
            "_id": self.id("namespace"),
            "service_name": self.service,
            "metadata": field(ns, "metadata"),
            "version": 1,
            "created_at": self.created,
            "updated_at": self.created,
        })]
    }

    fn secrets(&self) -> Vec<Value> {
        let Some(sec) = &self.sources.secret else {
            return vec![];
        };
        vec![json!({
            "_id": self.id("secret"),
            "service_name": self.service,
            "metadata": field(sec, "metadata"),
            "type": sec.get("type").cloned().unwrap_or_else(|| json!("")),
            "data": field(sec, "data"),
            "version": 1,
            "created_at": self.created,
            "updated_at": self.created,
        })]
    }

    fn argocd_applications(&self) -> Vec<Value> {
        let Some(app) = &self.sources.argocd_application else {
            return vec![];
        };
        let meta = field(app, "metadata");
        vec![json!({
            "_id": self.id("argocd"),
            "service_name": self.service,
            "metadata": {
                "name": meta.get("name").cloned().unwrap_or_else(|| json!(self.service)),
                "namespace": meta.get("namespace").cloned().unwrap_or_else(|| json!("argocd")),
                "finalizers": meta.get("finalizers").cloned().unwrap_or_else(|| json!([])),
            },
            "spec": field(app, "spec"),
            "version": 1,
            "created_at": self.created,
            "updated_at": self.created,
        })]
    }

    fn manifest_versions(&self) -> Vec<Value> {
        let Some(dep) = &self.sources.deployment else {
            return vec![];
        };
        vec![json!({
            "_id": self.id("deployment-v1"),
            "service_name": self.service,
            "manifest_type": "deployment",
            "version": 1,
            "content": dep,
            "changes": {
                "description": format!("Initial deployment for {}", self.service),
                "changed_by": "portal",
                "changed_fields": [
                    "spec.replicas",
                    "spec.template.spec.containers[0].image",
                    "spec.template.spec.containers[0].resources",
                ],
            },
            "created_at": self.created,
            "created_by": "portal",
        })]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractReport {
    pub service: String,
    pub output_dir: PathBuf,
    /// (file name, documents written) in collection order.
    pub files: Vec<(&'static str, usize)>,
}

/// Convert the manifests of `service` into the ten JSON collection files.
pub fn extract_service(service: &str, source_root: &Path, output_root: &Path, created: &str) -> Result<ExtractReport> {
    let source_dir = manifest_dir(source_root, service);
    let output_dir = output_root.join(service);
    fs::create_dir_all(&output_dir)
        .map_err(|e| anyhow!("Failed to create output folder {:?}: {}", output_dir, e))?;

    if !source_dir.is_dir() {
        return Err(anyhow!("K8s folder not found: {:?}", source_dir));
    }
    info!(service, "Extracting manifests from {:?}", source_dir);

    let sources = SourceManifests::load(&source_dir)?;
    let builder = CollectionBuilder::new(service, created, &sources);

    let mut files = Vec::with_capacity(COLLECTION_FILES.len());
    for entry in COLLECTION_FILES {
        let docs = builder.documents(entry.collection);
        write_json(&output_dir, entry.file, &Value::Array(docs.clone()))?;
        files.push((entry.file, docs.len()));
    }

    Ok(ExtractReport {
        service: service.to_string(),
        output_dir,
        files,
    })
}
