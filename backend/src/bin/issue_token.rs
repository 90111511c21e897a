//! Prints a signed bearer token for an operator.
//!
//! Usage: `issue_token --role observer [--sub <operator-uuid>] [--hours 8]`

use lifeline_backend::{
    config::Config,
    models::caller::CallerRole,
    types::OperatorId,
    utils::jwt::create_access_token,
};

#[derive(Debug, Clone, PartialEq)]
struct IssueOptions {
    operator_id: OperatorId,
    role: CallerRole,
    hours: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let options = parse_options(std::env::args().skip(1))?;
    let config = Config::load()?;
    let hours = options.hours.unwrap_or(config.jwt_expiration_hours);

    let token = create_access_token(options.operator_id, options.role, &config.jwt_secret, hours)?;
    eprintln!(
        "operator={} role={} expires_in={}h",
        options.operator_id,
        options.role.as_str(),
        hours
    );
    println!("{}", token);
    Ok(())
}

fn parse_options<I>(args: I) -> anyhow::Result<IssueOptions>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut operator_id = None;
    let mut role = None;
    let mut hours = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .map(|v| v.as_ref().to_string())
                .ok_or_else(|| anyhow::anyhow!("{} expects a value", arg.as_ref()))
        };
        match arg.as_ref() {
            "--sub" => {
                let raw = value()?;
                operator_id = Some(
                    raw.parse::<OperatorId>()
                        .map_err(|_| anyhow::anyhow!("--sub must be a UUID, got {}", raw))?,
                );
            }
            "--role" => role = Some(CallerRole::parse_lenient(&value()?)),
            "--hours" => {
                let raw = value()?;
                hours = Some(
                    raw.parse()
                        .map_err(|_| anyhow::anyhow!("--hours must be a number, got {}", raw))?,
                );
            }
            other => anyhow::bail!("unknown argument {}", other),
        }
    }

    Ok(IssueOptions {
        operator_id: operator_id.unwrap_or_default(),
        role: role.ok_or_else(|| anyhow::anyhow!("--role is required"))?,
        hours,
    })
}
