pub fn render_password_reset(reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Reset Your Password</h2>
    <p>You have requested to reset your password. Click the link below to choose a new one:</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #4caf50; color: white; text-decoration: none; border-radius: 5px;">Reset Password</a></p>
    <p style="color: #666; font-size: 14px;">This link expires in 1 hour and can be used once. If you did not request this, please ignore this email.</p>
</body>
</html>"#
    )
}

pub fn render_password_reset_success() -> String {
    r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Reset Successful</h2>
    <p>Your password has been successfully reset.</p>
    <p style="color: #666; font-size: 14px;">If you did not perform this action, please contact our support team immediately.</p>
</body>
</html>"#
        .to_string()
}
