use lambdeploy_client::GitlabClient;

use crate::error::DeployError;
use crate::invocation::DeployOutcome;
use crate::journal::Journal;

/// Set `external_url` on the GitLab environment named `git_env` of the
/// project at `project_path`.
///
/// A missing project, self link or environment is a warning and leaves the
/// outcome partially filled in. Remote failures abort.
pub async fn publish_external_url(
    journal: &Journal,
    gitlab: &GitlabClient,
    project_path: &str,
    git_env: &str,
    external_url: &str,
    outcome: &mut DeployOutcome,
) -> Result<(), DeployError> {
    journal.debug(format!(
        "GET {}/projects (looking for {project_path})",
        gitlab.base_url()
    ));
    let Some(project) = gitlab.find_project(project_path).await? else {
        journal.warn(format!("Could not find GitLab project for path {project_path}"));
        return Ok(());
    };
    let Some(project_url) = project.api_url() else {
        journal.warn(format!(
            "GitLab project {} has no self link; cannot update its environments",
            project.path_with_namespace
        ));
        return Ok(());
    };

    journal.info(format!(
        "Found GitLab project {} at {project_url}",
        project.path_with_namespace
    ));
    outcome.project_url = Some(project_url.clone());

    update_environment(journal, gitlab, &project_url, git_env, external_url, outcome).await
}

/// Point the environment `git_env` under `project_url` at `external_url`.
/// `project_url` is used as given.
pub async fn update_environment(
    journal: &Journal,
    gitlab: &GitlabClient,
    project_url: &str,
    git_env: &str,
    external_url: &str,
    outcome: &mut DeployOutcome,
) -> Result<(), DeployError> {
    journal.info("Searching for associated GitLab environment");
    let Some(environment) = gitlab.find_environment(project_url, git_env).await? else {
        journal.warn(format!(
            "Could not locate GitLab environment {git_env} in order to update external_url"
        ));
        return Ok(());
    };
    outcome.gitlab_env = Some(environment.name.clone());

    journal.info("Calling back to GitLab to provision new environment");
    gitlab
        .update_environment_url(project_url, &environment, external_url)
        .await?;
    outcome.update_gitlab_environment = Some("updated".to_string());
    Ok(())
}
