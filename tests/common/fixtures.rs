//! Test fixtures - reusable content constants for tests.

/// A small nginx Deployment with 2 replicas
pub const NGINX_DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: nginx-deployment
  labels:
    app: nginx
spec:
  replicas: 2
  selector:
    matchLabels:
      app: nginx
  template:
    metadata:
      labels:
        app: nginx
    spec:
      containers:
        - name: nginx
          image: nginx:1.25
          ports:
            - containerPort: 80
"#;

/// A Service selecting the nginx pods
pub const NGINX_SERVICE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: nginx-service
spec:
  selector:
    app: nginx
  ports:
    - protocol: TCP
      port: 80
      targetPort: 80
"#;

/// Base kustomization aggregating the deployment and service
pub const BASE_KUSTOMIZATION: &str = "resources:\n  - deployment.yaml\n  - service.yaml\n";

/// Overlay kustomization patching replicas to 3
pub const PROD_OVERLAY_KUSTOMIZATION: &str = r#"resources:
  - ../../base
patches:
  - path: replica-patch.yaml
"#;

/// Strategic-merge patch bumping replicas
pub const REPLICA_PATCH: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: nginx-deployment
spec:
  replicas: 3
"#;

/// A deployment that mounts a generated ConfigMap by its declared name
pub const DEPLOYMENT_WITH_CONFIG_REF: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: app
spec:
  replicas: 1
  selector:
    matchLabels:
      app: app
  template:
    metadata:
      labels:
        app: app
    spec:
      containers:
        - name: app
          image: app:1.0
          envFrom:
            - configMapRef:
                name: app-config
      volumes:
        - name: config
          configMap:
            name: app-config
"#;
