//! Session commands: login, register, logout.

use std::io::{BufRead, Write};

use kirana_client::api::types::SignupInput;

use super::{CommandError, Context};

/// Sign in and persist the token pair in the session file.
pub async fn login(identifier: &str, password: Option<&str>) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;

    let password = match password {
        Some(p) => p.to_owned(),
        None => prompt_password()?,
    };

    ctx.client.login(identifier, &password).await?;
    println!("Signed in as {identifier}");
    Ok(())
}

/// Create an account. Does not sign in; follow with `auth login`.
pub async fn register(
    email: &str,
    password: &str,
    name: Option<String>,
    phone: Option<String>,
) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;

    let input = SignupInput {
        email: email.to_owned(),
        password: password.to_owned(),
        full_name: name,
        phone_number: phone,
    };
    ctx.client.register(&input).await?;
    println!("Account created for {email}");
    Ok(())
}

/// Revoke the refresh token and clear the session file.
pub async fn logout() -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    ctx.client.logout().await?;
    println!("Signed out");
    Ok(())
}

fn prompt_password() -> Result<String, CommandError> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end().to_owned())
}
