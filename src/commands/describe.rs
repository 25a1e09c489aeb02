use crate::*;

pub fn handle_describe_commands(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    let Commands::Describe {
        archive,
        group,
        out,
    } = &cli.command
    else {
        return Ok(false);
    };

    let report = describe_archive(archive, group, out.as_deref(), config)?;
    print_one(cli.json, report, |r| {
        format!("{}\t{}", r.descriptor.id, r.path.display())
    })?;
    Ok(true)
}
