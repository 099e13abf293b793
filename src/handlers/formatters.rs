pub fn greeting(username: &str) -> String {
    format!(
        "Thanks for the report @{}! I will look into it ASAP! (I'm a bot).",
        username
    )
}

pub fn issue_notes_path(project_id: u64, issue_iid: u64) -> String {
    format!("/projects/{}/issues/{}/notes", project_id, issue_iid)
}

/// `group/project` paths go into the URL as a single encoded segment.
pub fn project_path(project: &str) -> String {
    project.replace('/', "%2F")
}
