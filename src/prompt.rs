use anyhow::Result;

/// Read a value without echoing it, e.g. an OTP secret.
pub fn prompt_password_hidden(prompt: &str) -> Result<String> {
    let pw = rpassword::prompt_password(prompt)?;
    Ok(pw.trim().to_string())
}
