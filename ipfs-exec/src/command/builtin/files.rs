//! `files add|cat|get`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::command::{CommandDescriptor, Handler};
use crate::error::CommandError;
use crate::harness::ExecutionContext;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::handler("files <command>", Arc::new(FilesCommand))
        .describe("Add, print, and download content")
        .with_options(options)
}

fn options(cmd: Command) -> Command {
    cmd.subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a file to the repository")
                .arg(Arg::new("path").required(true))
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .action(ArgAction::SetTrue)
                        .help("Print only the content id"),
                ),
        )
        .subcommand(
            Command::new("cat")
                .about("Print the content stored under a hash")
                .arg(Arg::new("hash").required(true)),
        )
        .subcommand(
            Command::new("get")
                .about("Download the content stored under a hash into a file")
                .arg(Arg::new("hash").required(true))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value(".")
                        .help("Directory to write into"),
                ),
        )
}

struct FilesCommand;

#[async_trait]
impl Handler for FilesCommand {
    async fn run(&self, args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        match args.subcommand() {
            Some(("add", m)) => add(m, &ctx).await?,
            Some(("cat", m)) => cat(m, &ctx).await?,
            Some(("get", m)) => get(m, &ctx).await?,
            Some((other, _)) => {
                return Err(CommandError::Failed(format!(
                    "unknown files subcommand: {other}"
                )))
            }
            None => return Err(CommandError::Failed("missing files subcommand".into())),
        }
        ctx.complete();
        Ok(())
    }
}

fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str, CommandError> {
    m.get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| CommandError::Failed(format!("missing argument <{id}>")))
}

async fn add(m: &ArgMatches, ctx: &ExecutionContext) -> Result<(), CommandError> {
    let path = required(m, "path")?;
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| CommandError::Failed(format!("failed to read {path}: {e}")))?;
    let cid = ctx.node().add(data).await?;
    if m.get_flag("quiet") {
        ctx.print(&cid);
    } else {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        ctx.print(format!("added {cid} {name}"));
    }
    Ok(())
}

async fn cat(m: &ArgMatches, ctx: &ExecutionContext) -> Result<(), CommandError> {
    let hash = required(m, "hash")?;
    let data = ctx.node().cat(hash).await?;
    ctx.sink().accept(data);
    Ok(())
}

async fn get(m: &ArgMatches, ctx: &ExecutionContext) -> Result<(), CommandError> {
    let hash = required(m, "hash")?;
    let dir = PathBuf::from(required(m, "output")?);
    let data = ctx.node().cat(hash).await?;
    tokio::fs::create_dir_all(&dir).await?;
    let target = dir.join(hash);
    tokio::fs::write(&target, data).await?;
    ctx.print(format!("Saving file(s) to {}", target.display()));
    Ok(())
}
