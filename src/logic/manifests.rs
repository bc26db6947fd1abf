use super::defaults::ResolvedService;
use crate::models::*;

/// Build the seven manifests of one service in emission order.
pub fn build_manifests(svc: &ResolvedService) -> Vec<Manifest> {
    vec![
        Manifest::Namespace(namespace(svc)),
        Manifest::ConfigMap(config_map(svc)),
        Manifest::Secret(secret(svc)),
        Manifest::Deployment(deployment(svc)),
        Manifest::Service(service(svc)),
        Manifest::HorizontalPodAutoscaler(hpa(svc)),
        Manifest::Ingress(ingress(svc)),
    ]
}

pub fn namespace(svc: &ResolvedService) -> Namespace {
    Namespace::new(ObjectMeta {
        name: svc.namespace.clone(),
        namespace: None,
        labels: Some(svc.namespace_labels.clone()),
    })
}

pub fn config_map(svc: &ResolvedService) -> ConfigMap {
    ConfigMap::new(
        ObjectMeta::namespaced(&svc.configmap.name, &svc.namespace),
        svc.configmap.data.clone(),
    )
}

pub fn secret(svc: &ResolvedService) -> Secret {
    Secret::new(
        ObjectMeta::namespaced(&svc.secret.name, &svc.namespace),
        &svc.secret.secret_type,
        svc.secret.data.clone(),
    )
}

pub fn deployment(svc: &ResolvedService) -> Deployment {
    let d = &svc.deployment;
    let container = Container {
        name: svc.name.clone(),
        image: d.image.clone(),
        ports: vec![ContainerPort {
            container_port: d.container_port,
        }],
        // Must track the ConfigMap emitted for the same service.
        env_from: vec![EnvFromSource {
            config_map_ref: NameRef {
                name: svc.configmap.name.clone(),
            },
        }],
        resources: ResourceRequirements {
            requests: ResourceList {
                cpu: d.cpu_request.clone(),
                memory: d.memory_request.clone(),
            },
            limits: ResourceList {
                cpu: d.cpu_limit.clone(),
                memory: d.memory_limit.clone(),
            },
        },
    };

    Deployment::new(
        ObjectMeta::namespaced(&d.name, &svc.namespace).with_labels(svc.pod_labels.clone()),
        DeploymentSpec {
            replicas: d.replicas,
            selector: LabelSelector {
                match_labels: svc.pod_labels.clone(),
            },
            template: PodTemplateSpec {
                metadata: TemplateMeta {
                    labels: svc.pod_labels.clone(),
                },
                spec: PodSpec {
                    containers: vec![container],
                },
            },
        },
    )
}

pub fn service(svc: &ResolvedService) -> Service {
    Service::new(
        ObjectMeta::namespaced(&svc.service.name, &svc.namespace),
        ServiceSpec {
            service_type: svc.service.service_type.clone(),
            selector: svc.pod_labels.clone(),
            ports: vec![ServicePort {
                port: svc.port,
                target_port: svc.service.target_port,
                protocol: "TCP".to_string(),
            }],
        },
    )
}

pub fn hpa(svc: &ResolvedService) -> HorizontalPodAutoscaler {
    HorizontalPodAutoscaler::new(
        ObjectMeta::namespaced(&svc.hpa.name, &svc.namespace),
        HpaSpec {
            scale_target_ref: ScaleTargetRef {
                api_version: "apps/v1".to_string(),
                kind: "Deployment".to_string(),
                name: svc.deployment.name.clone(),
            },
            min_replicas: svc.hpa.min_replicas,
            max_replicas: svc.hpa.max_replicas,
            metrics: vec![MetricSpec {
                metric_type: "Resource".to_string(),
                resource: ResourceMetric {
                    name: "cpu".to_string(),
                    target: MetricTarget {
                        target_type: "Utilization".to_string(),
                        average_utilization: svc.hpa.target_cpu_utilization,
                    },
                },
            }],
        },
    )
}

pub fn ingress(svc: &ResolvedService) -> Ingress {
    Ingress::new(
        ObjectMeta::namespaced(&svc.ingress.name, &svc.namespace),
        IngressSpec {
            rules: vec![IngressRule {
                host: svc.ingress.host.clone(),
                http: HttpIngressRule {
                    paths: vec![HttpIngressPath {
                        path: svc.ingress.path.clone(),
                        path_type: "Prefix".to_string(),
                        backend: IngressBackend {
                            service: IngressServiceBackend {
                                name: svc.service.name.clone(),
                                port: BackendPort { number: svc.port },
                            },
                        },
                    }],
                },
            }],
        },
    )
}
