//! `courier artifact` command

use anyhow::Result;

use crate::commands::Session;
use courier::ops::render_interface;
use courier::util::hash::sha256_str;

pub fn execute(session: &Session) -> Result<()> {
    let ws = session.workspace()?;
    let artifact = ws.load_artifact()?;
    let abi = artifact.abi();

    let rendered = render_interface(artifact.abi_json())?;

    let shell = &session.shell;
    shell.note(format!("contract     {}", artifact.contract_name()));
    if let Some(source) = artifact.source_name() {
        shell.note(format!("source       {}", source));
    }
    shell.note(format!("artifact     {}", ws.display_path(artifact.path())));
    shell.note(format!(
        "abi          {} functions, {} events, {} errors",
        abi.functions().count(),
        abi.events().count(),
        abi.errors().count()
    ));
    match abi.constructor.as_ref().filter(|c| !c.inputs.is_empty()) {
        Some(ctor) => {
            let params: Vec<String> = ctor
                .inputs
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name))
                .collect();
            shell.note(format!("constructor  ({})", params.join(", ")));
        }
        None => shell.note("constructor  ()"),
    }
    match artifact.deployed_size().filter(|size| *size > 0) {
        Some(size) => shell.note(format!("runtime      {} bytes", size)),
        None => shell.warn("no runtime bytecode; the contract cannot be deployed"),
    }

    shell.output(sha256_str(&rendered));
    Ok(())
}
