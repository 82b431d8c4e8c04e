use tracker_core::{AuthFlow, AuthService, PasswordStrength, ProfileService, SignUpRequest};
use tracker_domain::DEFAULT_TARGET_BALANCE;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::{CommandEntry, CommandGroup};

const SIGNUP_USAGE: &str = "signup <name> <email> <password> [phone]";
const LOGIN_USAGE: &str = "login <email> [password] [--remember]";
const RESET_USAGE: &str = "reset-password <email> | reset-password confirm <code> <new-password>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "signup",
            CommandGroup::Account,
            "Create an account and sign in",
            SIGNUP_USAGE,
            cmd_signup,
        ),
        CommandEntry::new(
            "login",
            CommandGroup::Account,
            "Sign in with email and password",
            LOGIN_USAGE,
            cmd_login,
        ),
        CommandEntry::new(
            "logout",
            CommandGroup::Account,
            "Sign out of the current account",
            "logout",
            cmd_logout,
        ),
        CommandEntry::new(
            "reset-password",
            CommandGroup::Account,
            "Request or confirm a password reset",
            RESET_USAGE,
            cmd_reset_password,
        ),
    ]
}

fn cmd_signup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let request = if args.len() >= 3 {
        SignUpRequest {
            name: args[0].to_string(),
            email: args[1].to_string(),
            password: args[2].to_string(),
            phone_number: args.get(3).map(|phone| phone.to_string()),
        }
    } else if context.can_prompt() {
        prompt_sign_up(context, args)?
    } else {
        return Err(CommandError::usage(SIGNUP_USAGE));
    };

    let outcome = AuthService::sign_up(&context.client, &request)
        .map_err(|err| CommandError::auth(err, AuthFlow::SignUp))?;

    let configured = context.config.default_target_balance;
    if configured != DEFAULT_TARGET_BALANCE {
        ProfileService::set_target_balance(&context.client, configured)?;
    }

    io::print_success(format!(
        "Welcome, {}! Signed in as {}.",
        outcome.profile.display_name(),
        outcome.user.email
    ));
    if outcome.strength == PasswordStrength::Weak {
        io::print_hint("Password strength: weak. Longer mixed-character passwords are safer.");
    } else {
        io::print_info(format!("Password strength: {}", outcome.strength));
    }
    Ok(())
}

fn prompt_sign_up(context: &ShellContext, args: &[&str]) -> Result<SignUpRequest, CommandError> {
    let name = match args.first() {
        Some(name) => name.to_string(),
        None => io::prompt_text(&context.theme, "Name", None)?,
    };
    let email = match args.get(1) {
        Some(email) => email.to_string(),
        None => io::prompt_text(&context.theme, "Email", None)?,
    };
    let password = io::prompt_new_password(&context.theme, "Password")?;
    let phone = io::prompt_text(&context.theme, "Phone (optional)", None)?;
    Ok(SignUpRequest {
        name,
        email,
        password,
        phone_number: Some(phone),
    })
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let remember = args.iter().any(|arg| *arg == "--remember");
    let positional: Vec<&str> = args
        .iter()
        .copied()
        .filter(|arg| !arg.starts_with("--"))
        .collect();

    let email = match positional.first() {
        Some(email) => email.to_string(),
        None => match (&context.config.remembered_email, context.can_prompt()) {
            (Some(saved), false) => saved.clone(),
            (saved, true) => io::prompt_text(&context.theme, "Email", saved.as_deref())?,
            (None, false) => return Err(CommandError::usage(LOGIN_USAGE)),
        },
    };
    let password = match positional.get(1) {
        Some(password) => password.to_string(),
        None if context.can_prompt() => io::prompt_password(&context.theme, "Password")?,
        None => return Err(CommandError::usage(LOGIN_USAGE)),
    };

    let user = AuthService::sign_in(&context.client, &email, &password)
        .map_err(|err| CommandError::auth(err, AuthFlow::SignIn))?;

    let remembered = remember.then_some(user.email.as_str());
    if context.config.remembered_email.as_deref() != remembered {
        context.config.remember_email(remembered);
        context.save_config()?;
    }
    io::print_success(format!("Signed in as {}.", user.email));
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.client.auth.current_user().is_none() {
        io::print_info("No account is signed in.");
        return Ok(());
    }
    AuthService::sign_out(&context.client)?;
    context.reset_live_dashboard();
    io::print_success("Signed out.");
    Ok(())
}

fn cmd_reset_password(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["confirm", code, new_password] => {
            AuthService::confirm_password_reset(&context.client, code, new_password)
                .map_err(|err| CommandError::auth(err, AuthFlow::PasswordReset))?;
            io::print_success("Password updated. Sign in with the new password.");
            Ok(())
        }
        ["confirm", ..] => Err(CommandError::usage(RESET_USAGE)),
        [email] => {
            AuthService::send_password_reset(&context.client, email)
                .map_err(|err| CommandError::auth(err, AuthFlow::PasswordReset))?;
            io::print_success("Password reset requested.");
            if let Some(code) = context.backend.pending_reset_code(email) {
                io::print_info(format!("Reset code: {code}"));
                io::print_hint("Run `reset-password confirm <code> <new-password>` to finish.");
            }
            Ok(())
        }
        [] if context.can_prompt() => {
            let email = io::prompt_text(&context.theme, "Email", None)?;
            cmd_reset_password(context, &[email.as_str()])
        }
        _ => Err(CommandError::usage(RESET_USAGE)),
    }
}
