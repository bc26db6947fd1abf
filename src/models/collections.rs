/// One JSON collection file and the database collection it is imported into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionFile {
    pub file: &'static str,
    pub collection: &'static str,
}

impl CollectionFile {
    const fn new(file: &'static str, collection: &'static str) -> Self {
        Self { file, collection }
    }

    /// The `services` collection holds one document per service and has no
    /// `service_name` field; it is keyed by `_id` / `name` instead.
    pub fn keyed_by_name(&self) -> bool {
        self.collection == SERVICES
    }
}

pub const SERVICES: &str = "services";

/// Import order. `extract` writes every one of these files, `import` reads them.
pub const COLLECTION_FILES: [CollectionFile; 10] = [
    CollectionFile::new("services.json", SERVICES),
    CollectionFile::new("deployments.json", "deployments"),
    CollectionFile::new("k8s_services.json", "k8s_services"),
    CollectionFile::new("configmaps.json", "configmaps"),
    CollectionFile::new("hpas.json", "hpas"),
    CollectionFile::new("ingresses.json", "ingresses"),
    CollectionFile::new("namespaces.json", "namespaces"),
    CollectionFile::new("secrets.json", "secrets"),
    CollectionFile::new("argocd_applications.json", "argocd_applications"),
    CollectionFile::new("manifest_versions.json", "manifest_versions"),
];

pub fn collection_names() -> impl Iterator<Item = &'static str> {
    COLLECTION_FILES.iter().map(|c| c.collection)
}
