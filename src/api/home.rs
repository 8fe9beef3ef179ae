use crate::api::AppState;
use crate::api::middleware::CurrentSession;
use axum::{extract::State, response::Html};

/// Landing page showing setup instructions and, once connected, the available actions.
pub async fn index(State(state): State<AppState>, current: CurrentSession) -> Html<String> {
    Html(render_index(
        state.auth_service.is_configured(),
        current.session.is_authenticated(),
        state.auth_service.redirect_uri(),
    ))
}

pub(crate) fn render_index(configured: bool, authenticated: bool, redirect_uri: &str) -> String {
    let connect = if configured {
        r#"<a href="/auth" class="button">Connect with Canva</a>"#
    } else {
        r#"<p style="color: red;">Please configure your CANVA_CLIENT_ID in the .env file</p>"#
    };

    let actions = if authenticated {
        r#"<div>
            <p>You are connected to Canva!</p>
            <a href="/profile" class="button">View Profile</a>
            <a href="/designs" class="button">List Designs</a>
            <a href="/logout" class="button">Logout</a>
        </div>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Canva Connect API Starter</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; line-height: 1.6; }}
        .button {{ display: inline-block; background: #7C3AED; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; margin: 10px 0; }}
        .button:hover {{ background: #5B21B6; }}
        .info {{ background: #F3F4F6; padding: 15px; border-radius: 6px; margin: 20px 0; }}
    </style>
</head>
<body>
    <h1>Canva Connect API Starter</h1>
    <p>Welcome to your Canva Connect API integration starter template!</p>
    <div class="info">
        <h3>Setup Required:</h3>
        <p>Before you can start, make sure to:</p>
        <ol>
            <li>Create a Canva app at <a href="https://www.canva.com/developers/apps" target="_blank">Canva Developer Portal</a></li>
            <li>Set your environment variables in the <code>.env</code> file</li>
            <li>Configure your redirect URI to: <code>{redirect_uri}</code></li>
        </ol>
    </div>
    {connect}
    {actions}
</body>
</html>
"#,
        redirect_uri = escape_html(redirect_uri),
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
