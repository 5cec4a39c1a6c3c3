use std::sync::Arc;

use genpanel::{
    app::RemoteJobManager,
    infra::remote::{HttpGenerationRemote, RemoteConfig},
};

pub(super) struct RemoteBackend {
    pub(super) job_manager: Option<Arc<RemoteJobManager>>,
    pub(super) base_url: String,
    pub(super) startup_notice: Option<String>,
}

pub(super) fn build_remote_backend() -> RemoteBackend {
    let mut notices = Vec::new();
    let config = match RemoteConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            notices.push(format!(
                "Invalid generation service configuration, using defaults: {}",
                error.user_message()
            ));
            RemoteConfig::default()
        }
    };

    build_remote_backend_from_config(config, notices)
}

pub(super) fn build_remote_backend_from_config(
    config: RemoteConfig,
    mut notices: Vec<String>,
) -> RemoteBackend {
    let base_url = config.base_url.clone();

    let remote = match HttpGenerationRemote::new(config) {
        Ok(remote) => remote,
        Err(error) => {
            notices.push(format!(
                "Generation service client could not be created: {}",
                error.user_message()
            ));
            return unavailable_backend(base_url, notices);
        }
    };

    let job_manager = match RemoteJobManager::new(Arc::new(remote)) {
        Ok(manager) => manager,
        Err(error) => {
            notices.push(format!(
                "Failed to start remote worker: {}",
                error.user_message()
            ));
            return unavailable_backend(base_url, notices);
        }
    };

    tracing::info!(base_url = %base_url, "generation service configured");

    RemoteBackend {
        job_manager: Some(Arc::new(job_manager)),
        base_url,
        startup_notice: join_notices(notices),
    }
}

fn unavailable_backend(base_url: String, notices: Vec<String>) -> RemoteBackend {
    let startup_notice = join_notices(notices);
    if let Some(notice) = &startup_notice {
        tracing::warn!("generation service unavailable: {notice}");
    }

    RemoteBackend {
        job_manager: None,
        base_url,
        startup_notice,
    }
}

fn join_notices(notices: Vec<String>) -> Option<String> {
    (!notices.is_empty()).then(|| notices.join(" "))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use genpanel::infra::remote::RemoteConfig;

    use super::build_remote_backend_from_config;

    #[test]
    fn valid_config_starts_worker_without_notice() {
        let backend = build_remote_backend_from_config(
            RemoteConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                timeout: Some(Duration::from_secs(5)),
            },
            Vec::new(),
        );

        assert!(backend.job_manager.is_some());
        assert_eq!(backend.base_url, "http://127.0.0.1:9");
        assert_eq!(backend.startup_notice, None);
    }

    #[test]
    fn empty_base_url_leaves_backend_unavailable_with_notice() {
        let backend = build_remote_backend_from_config(
            RemoteConfig {
                base_url: "  ".to_string(),
                timeout: None,
            },
            vec!["earlier notice.".to_string()],
        );

        assert!(backend.job_manager.is_none());
        let notice = backend.startup_notice.expect("notice should be reported");
        assert!(notice.starts_with("earlier notice. "));
        assert!(notice.contains("base URL must not be empty"));
    }
}
