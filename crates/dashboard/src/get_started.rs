use std::fmt::Write;

use crossterm::style::Color;

use crate::render::{printable, Component, RenderContext, RenderError};

/// A consensus client the setup guide knows how to checkpoint sync.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusClient {
    pub name: &'static str,
    pub description: &'static str,
    pub default_port: Option<u16>,
    command_line: fn(&str) -> String,
    log_check: fn(&str) -> String,
}

impl ConsensusClient {
    pub fn command_line(&self, public_url: &str) -> String {
        (self.command_line)(public_url)
    }

    pub fn log_check(&self, public_url: &str) -> String {
        (self.log_check)(public_url)
    }
}

fn refer_to_docs(_: &str) -> String {
    "No Consensus client set\n\
     Refer to your client's documentation for more information on how to checkpoint sync."
        .to_string()
}

pub static CLIENTS: [ConsensusClient; 6] = [
    ConsensusClient {
        name: "Not applicable",
        description: "Choose this option if you don't want client specific details.",
        default_port: None,
        command_line: refer_to_docs,
        log_check: refer_to_docs,
    },
    ConsensusClient {
        name: "Lighthouse",
        description: "Lighthouse is an open-source Ethereum consensus client, written in Rust and maintained by Sigma Prime.",
        default_port: Some(5052),
        command_line: |url| format!("--checkpoint-sync-url={url}"),
        log_check: |url| {
            format!(
                "INFO Starting checkpoint sync                remote_url: {url}, service: beacon\n\
                 INFO Loaded checkpoint block and state       state_root: 0x854ca984298e6a0d9fc098b4e37f1b28727e545a8e4d3106188fda3587d14cdb, block_root: 0x91e4f5129bc54f7284f1690e00803db360aeb63d34610d6995e1145bd01c0d92, slot: 529024, service: beacon"
            )
        },
    },
    ConsensusClient {
        name: "Lodestar",
        description: "Lodestar is a TypeScript implementation of the Ethereum Consensus specification developed by ChainSafe Systems.",
        default_port: Some(9596),
        command_line: |url| format!("--checkpointSyncUrl={url}"),
        log_check: |url| {
            format!(
                "info: Fetching weak subjectivity state weakSubjectivityServerUrl={url}\n\
                 info: Download completed\n\
                 info: Initializing beacon state from anchor state slot=529024, epoch=16532, stateRoot=0x854ca984298e6a0d9fc098b4e37f1b28727e545a8e4d3106188fda3587d14cdb"
            )
        },
    },
    ConsensusClient {
        name: "Nimbus",
        description: "Nimbus is an extremely efficient Ethereum consensus layer client implementation developed by Status Research & Development.",
        default_port: Some(5052),
        command_line: |_| {
            "Requires the trustedNodeSync command to be run before the beacon is launched. \
             Read more here: https://nimbus.guide/trusted-node-sync.html"
                .to_string()
        },
        log_check: |url| {
            format!(
                "Starting trusted node sync                 databaseDir=/data/consensus/db restUrl={url} blockId=finalized backfill=false reindex=false\n\
                 Downloading checkpoint block               restUrl={url} blockId=finalized\n\
                 Downloading checkpoint state               restUrl={url} checkpointSlot=529024\n\
                 Writing checkpoint state                   stateRoot=91e4f512\n\
                 Writing checkpoint block                   blockRoot=13b4cc5f blck=\"(slot: 529024, proposer_index: 1466, parent_root: \\\"0b019674\\\", state_root: \\\"854ca984\\\")\""
            )
        },
    },
    ConsensusClient {
        name: "Prysm",
        description: "Prysm is an Ethereum proof-of-stake client written in Go developed by Prysmatic Labs.",
        default_port: Some(3500),
        command_line: |url| format!("--checkpoint-sync-url={url}\n--genesis-beacon-api-url={url}"),
        log_check: |url| {
            format!(
                "level=info msg=\"requesting {url}/eth/v2/debug/beacon/states/genesis\"\n\
                 level=info msg=\"requesting {url}/eth/v2/debug/beacon/states/finalized\"\n\
                 level=info msg=\"requesting {url}/eth/v2/beacon/blocks/0x91e4f5129bc54f7284f1690e00803db360aeb63d34610d6995e1145bd01c0d92\"\n\
                 level=info msg=\"BeaconState slot=529024, Block slot=529024\"\n\
                 level=info msg=\"BeaconState htr=0x854ca984298e6a0d9fc098b4e37f1b28727e545a8e4d3106188fda3587d14cdbd, Block state_root=0x854ca984298e6a0d9fc098b4e37f1b28727e545a8e4d3106188fda3587d14cdb\""
            )
        },
    },
    ConsensusClient {
        name: "Teku",
        description: "Teku is a Java-based Ethereum 2.0 client developed by ConsenSys.",
        default_port: Some(5051),
        command_line: |url| format!("--checkpoint-sync-url={url}"),
        log_check: |url| {
            format!(
                "INFO  - Loading initial state from {url}\n\
                 INFO  - Loaded initial state at epoch 16532 (state root = 0x854ca984298e6a0d9fc098b4e37f1b28727e545a8e4d3106188fda3587d14cdb, block root = 0x91e4f5129bc54f7284f1690e00803db360aeb63d34610d6995e1145bd01c0d92, block slot = 529024).  Please ensure that the supplied initial state corresponds to the latest finalized block as of the start of epoch 16532 (slot 529024).\""
            )
        },
    },
];

/// Case-insensitive lookup by client name.
pub fn find_client(name: &str) -> Option<&'static ConsensusClient> {
    CLIENTS
        .iter()
        .find(|client| client.name.eq_ignore_ascii_case(name.trim()))
}

const READING_LIST: [&str; 4] = [
    "https://www.symphonious.net/2022/05/21/checkpoint-sync-safety/",
    "https://ethereum.org/en/developers/docs/consensus-mechanisms/pos/weak-subjectivity/",
    "https://blog.ethereum.org/2014/11/25/proof-stake-learned-love-weak-subjectivity/",
    "https://notes.ethereum.org/@djrtwo/ws-sync-in-practice",
];

const FINALIZED_HEADER_URL: &str =
    "http://YOUR_NODE_IP:YOUR_NODE_PORT/eth/v1/beacon/headers/finalized";

/// Checkpoint sync walkthrough. Without a client it lists the choices.
pub struct GetStarted<'a> {
    client: Option<&'a ConsensusClient>,
    public_url: &'a str,
}

impl<'a> GetStarted<'a> {
    pub fn new(client: Option<&'a ConsensusClient>, public_url: &'a str) -> Self {
        Self { client, public_url }
    }

    fn selection(&self, ctx: &RenderContext, out: &mut String) -> Result<(), RenderError> {
        writeln!(
            out,
            "{}",
            ctx.bold("Which Ethereum consensus client are you using?")
        )?;
        writeln!(out)?;
        for client in &CLIENTS {
            writeln!(out, "  {}", ctx.paint(client.name, Color::Magenta))?;
            writeln!(out, "    {}", client.description)?;
        }
        writeln!(out)?;
        writeln!(out, "Re-run with --client <NAME> to see the guide for one of them.")?;
        Ok(())
    }

    fn step(ctx: &RenderContext, out: &mut String, number: u8) -> Result<(), RenderError> {
        writeln!(out)?;
        writeln!(out, "{}", ctx.bold(&format!("Step {number}")))?;
        writeln!(out, "{}", "-".repeat(6))?;
        Ok(())
    }

    fn indented(out: &mut String, block: &str) -> Result<(), RenderError> {
        for line in block.lines() {
            writeln!(out, "    {line}")?;
        }
        Ok(())
    }

    fn guide(
        &self,
        client: &ConsensusClient,
        ctx: &RenderContext,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let url = printable(self.public_url);

        writeln!(out, "Consensus client: {}", ctx.bold(client.name))?;
        writeln!(out)?;
        writeln!(
            out,
            "This guide covers the additional steps required to checkpoint sync a beacon node \
             from another beacon node that you trust. This guide does not cover setting up an \
             entire node from scratch."
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "{} You should always verify that your beacon node is synced correctly after doing \
             a checkpoint sync. Refer to step 4 for more information.",
            ctx.paint("Remember:", Color::Yellow)
        )?;
        writeln!(out)?;
        writeln!(out, "More reading on checkpoint sync:")?;
        for link in READING_LIST {
            writeln!(out, "  » {link}")?;
        }

        Self::step(ctx, out, 1)?;
        writeln!(
            out,
            "Note down the beacon endpoint you're planning to checkpoint sync from. This can be \
             another beacon node you run, a beacon node that a friend runs, the endpoint of this \
             Checkpointz instance, or any beacon node you trust."
        )?;
        writeln!(
            out,
            "{} The source beacon node must be for the same Ethereum network as your beacon node.",
            ctx.paint("Note:", Color::Blue)
        )?;
        writeln!(
            out,
            "The current Checkpointz instance endpoint will now be used for the rest of this guide."
        )?;
        writeln!(out)?;
        writeln!(out, "    {}", ctx.bold(&url))?;

        Self::step(ctx, out, 2)?;
        writeln!(out, "Add the checkpoint sync argument to your client.")?;
        writeln!(out)?;
        Self::indented(out, &client.command_line(&url))?;

        Self::step(ctx, out, 3)?;
        writeln!(
            out,
            "Start your client. Once started, check your logs for details surrounding the \
             checkpoint process."
        )?;
        writeln!(out)?;
        Self::indented(out, &client.log_check(&url))?;

        Self::step(ctx, out, 4)?;
        writeln!(
            out,
            "Validate that your node is on the expected chain. To do this we'll check the state \
             root of the finalized checkpoint against another source."
        )?;
        writeln!(out)?;
        write!(out, "You will need to know the IP & Port of your beacon node.")?;
        if let Some(port) = client.default_port {
            write!(out, " The default port for {} is {port}.", client.name)?;
        }
        writeln!(out)?;

        writeln!(out)?;
        writeln!(out, "{}", ctx.bold("Obtaining finalized checkpoint and state root"))?;
        writeln!(out, "  Option A")?;
        writeln!(out, "    1. Open {FINALIZED_HEADER_URL} in your browser.")?;
        writeln!(out, "    2. Find the slot number.")?;
        writeln!(out, "    3. Find the state_root value.")?;
        writeln!(out, "  Option B")?;
        writeln!(out, "    1. Install curl and jq.")?;
        writeln!(out, "    2. In a new terminal window run:")?;
        writeln!(
            out,
            "         curl -s {FINALIZED_HEADER_URL} | jq .'data.header.message'"
        )?;

        writeln!(out)?;
        writeln!(out, "{}", ctx.bold("Validate against a known source"))?;
        writeln!(
            out,
            "The slot and state root values below are the ones retrieved in the step above."
        )?;
        writeln!(out, "  Option A")?;
        writeln!(
            out,
            "    1. In a new browser tab/window, open https://beaconcha.in/block/SLOT, replacing \
             SLOT with your slot value."
        )?;
        writeln!(
            out,
            "    2. Check that the State Root field displayed matches your state root value."
        )?;
        writeln!(out, "  Option B")?;
        writeln!(
            out,
            "    1. Open another Checkpointz instance. This must be different to this \
             Checkpointz instance!"
        )?;
        writeln!(
            out,
            "    2. Check the historical checkpoints table and search for the row that \
             contains your slot value."
        )?;
        writeln!(out, "    3. Make sure your state root value matches.")?;
        writeln!(out)?;
        writeln!(
            out,
            "If it's a match, congratulations 🎉. If it's not a match you should start from \
             scratch by wiping your beacon node and starting from the top."
        )?;
        Ok(())
    }
}

impl Component for GetStarted<'_> {
    fn name(&self) -> &'static str {
        "get-started"
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let mut out = String::new();
        match self.client {
            Some(client) => self.guide(client, ctx, &mut out)?,
            None => self.selection(ctx, &mut out)?,
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    const URL: &str = "https://sync.example.org";

    fn ctx() -> RenderContext {
        RenderContext::plain_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[rstest::rstest]
    #[case("lighthouse", "Lighthouse")]
    #[case("TEKU", "Teku")]
    #[case(" prysm ", "Prysm")]
    #[case("not applicable", "Not applicable")]
    fn test_find_client(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(find_client(query).map(|client| client.name), Some(expected));
    }

    #[test]
    fn test_find_unknown_client() {
        assert!(find_client("grandine").is_none());
    }

    #[rstest::rstest]
    #[case("Lighthouse", "--checkpoint-sync-url=https://sync.example.org")]
    #[case("Lodestar", "--checkpointSyncUrl=https://sync.example.org")]
    #[case(
        "Prysm",
        "--checkpoint-sync-url=https://sync.example.org\n--genesis-beacon-api-url=https://sync.example.org"
    )]
    #[case("Teku", "--checkpoint-sync-url=https://sync.example.org")]
    fn test_command_line(#[case] name: &str, #[case] expected: &str) {
        let client = find_client(name).unwrap();

        assert_eq!(client.command_line(URL), expected);
    }

    #[rstest::rstest]
    #[case("Lighthouse", Some(5052))]
    #[case("Lodestar", Some(9596))]
    #[case("Nimbus", Some(5052))]
    #[case("Prysm", Some(3500))]
    #[case("Teku", Some(5051))]
    #[case("Not applicable", None)]
    fn test_default_ports(#[case] name: &str, #[case] port: Option<u16>) {
        assert_eq!(find_client(name).unwrap().default_port, port);
    }

    #[test]
    fn test_nimbus_points_to_trusted_node_sync() {
        let client = find_client("nimbus").unwrap();

        assert!(client.command_line(URL).contains("trustedNodeSync"));
        assert!(client.log_check(URL).contains("restUrl=https://sync.example.org"));
    }

    #[test]
    fn test_selection_lists_every_client() {
        let out = GetStarted::new(None, URL).render(&ctx()).unwrap();

        assert!(out.starts_with("Which Ethereum consensus client are you using?"));
        for client in &CLIENTS {
            assert!(out.contains(client.name));
        }
    }

    #[test]
    fn test_lighthouse_guide() {
        let client = find_client("lighthouse").unwrap();

        let out = GetStarted::new(Some(client), URL).render(&ctx()).unwrap();

        assert!(out.contains("    --checkpoint-sync-url=https://sync.example.org\n"));
        assert!(out.contains("remote_url: https://sync.example.org, service: beacon"));
        assert!(out.contains("The default port for Lighthouse is 5052."));
        for step in 1..=4 {
            assert!(out.contains(&format!("Step {step}\n")));
        }
        assert!(out.contains("/eth/v1/beacon/headers/finalized"));
    }

    #[test]
    fn test_not_applicable_guide_has_no_port() {
        let client = find_client("Not applicable").unwrap();

        let out = GetStarted::new(Some(client), URL).render(&ctx()).unwrap();

        assert!(out.contains("Refer to your client's documentation"));
        assert!(!out.contains("The default port"));
    }
}
