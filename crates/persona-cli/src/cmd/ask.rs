use crate::session::AgentSession;
use anyhow::bail;
use cli_driver::Preference;
use persona_core::Store;

/// Single query mode: bind, send one message, print the reply.
pub fn run(preference: Preference, config: Option<&str>, prompt: &str) -> anyhow::Result<()> {
    if prompt.trim().is_empty() {
        bail!("no prompt given (usage: persona ask <question>)");
    }

    let rt = tokio::runtime::Runtime::new()?;
    let mut session = AgentSession::open(Store::from_env(), config)?;

    rt.block_on(session.bind(preference));
    if !session.binding().is_bound() {
        bail!(
            "no assistant CLI found for '{preference}' (install the claude or gemini \
             command line tool, or check your PATH)"
        );
    }

    let reply = rt.block_on(session.send(prompt))?;
    println!("{reply}");
    Ok(())
}
