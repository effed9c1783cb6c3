//! Login command handler: the setup-flow credential check.

use serde::Serialize;

use marspro_core::Hub;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct LoginReport {
    title: String,
    username: String,
    user_id: Option<String>,
    nick_name: Option<String>,
}

fn detail(r: &LoginReport) -> String {
    let mut lines = vec![
        format!("Account:  {}", r.username),
        format!("Title:    {}", r.title),
    ];
    if let Some(ref id) = r.user_id {
        lines.push(format!("User ID:  {id}"));
    }
    if let Some(ref nick) = r.nick_name {
        lines.push(format!("Nickname: {nick}"));
    }
    lines.join("\n")
}

pub async fn handle(hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    let title = hub.validate_credentials().await?;
    let profile = hub.client().user_info().unwrap_or_default();

    let report = LoginReport {
        title,
        username: hub.config().credentials.username.clone(),
        user_id: profile.user_id,
        nick_name: profile.nick_name,
    };

    output::print_status("Credentials accepted", global.quiet);
    let out = output::render_single(&global.output, &report, detail, |r| r.title.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
