use anyhow::Result;

use super::{password_or_stdin, AppContext};

pub async fn login(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let password = password_or_stdin(password)?;
    let session = ctx.session.login(&ctx.api, email, &password).await?;
    if let Some(user) = session.user {
        println!("Signed in as {} <{}>", display_name(&user.name), user.email);
    }
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_stdin(password)?;
    let session = ctx.session.register(&ctx.api, name, email, &password).await?;
    if let Some(user) = session.user {
        println!("Registered and signed in as {} <{}>", display_name(&user.name), user.email);
    }
    Ok(())
}

pub async fn whoami(ctx: &AppContext, refresh: bool) -> Result<()> {
    let user = if refresh {
        Some(ctx.session.refresh_profile(&ctx.api).await?)
    } else {
        ctx.session.current_user()
    };

    match (ctx.session.is_authenticated(), user) {
        (true, Some(user)) => println!("{} <{}>", display_name(&user.name), user.email),
        (true, None) => println!("Signed in (profile not loaded, try --refresh)"),
        (false, _) => println!("Not signed in"),
    }
    Ok(())
}

pub fn rename(ctx: &AppContext, name: &str) -> Result<()> {
    let user = ctx.session.update_display_name(name)?;
    println!("Display name set to {}", display_name(&user.name));
    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(no name)"
    } else {
        name
    }
}
