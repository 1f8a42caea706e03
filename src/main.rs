use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use chainrule::config::{Cli, CommandKind, ModelArgs, ShowArgs, TuiArgs};
use chainrule::steps::parse_step;
use chainrule::text::{parse_script, render, run_script};
use chainrule::{logging, tui, Command, ScalarModel, Walkthrough, AUTOPLAY_DELAY};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init_tracing(cli.log_directive(), cli.log_sink()) {
        eprintln!("warning: {e}");
    }
    if let Err(e) = dispatch(cli) {
        eprintln!("fatal: {e:?}");
        std::process::exit(2);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let model = ScalarModel::reference();
    match cli.command.unwrap_or(CommandKind::Tui(TuiArgs::default())) {
        CommandKind::Tui(args) => {
            let delay = args.autoplay.delay()?;
            tui::run(Walkthrough::new(model, delay)).context("terminal walkthrough failed")
        }
        CommandKind::Show(args) => cmd_show(model, &args),
        CommandKind::Model(args) => cmd_model(model, &args),
        CommandKind::Script(args) => {
            let delay = args.autoplay.delay()?;
            let steps = parse_script(&args.commands).context("invalid script")?;
            run_script(model, delay, &steps, &mut io::stdout().lock())?;
            Ok(())
        }
    }
}

fn cmd_show(model: ScalarModel, args: &ShowArgs) -> Result<()> {
    let index = parse_step(&args.step)?;
    let mut walkthrough = Walkthrough::new(model, AUTOPLAY_DELAY);
    walkthrough.apply(Command::JumpTo(index), Instant::now());

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, walkthrough.snapshot())?;
        writeln!(out)?;
    } else {
        out.write_all(render(walkthrough.snapshot()).as_bytes())?;
    }
    Ok(())
}

fn cmd_model(model: ScalarModel, args: &ModelArgs) -> Result<()> {
    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &model)?;
        writeln!(out)?;
        return Ok(());
    }

    let inputs = model.inputs();
    writeln!(out, "a_i          {}", inputs.a_i)?;
    writeln!(out, "w_ij         {}", inputs.w_ij)?;
    writeln!(out, "b_j          {}", inputs.b_j)?;
    writeln!(out, "other_inputs {}", inputs.other_inputs)?;
    writeln!(out, "target       {}", inputs.target)?;
    writeln!(out, "eta          {}", model.learning_rate())?;
    writeln!(out)?;
    for (name, value) in [
        ("z_j", model.z_j()),
        ("a_j", model.a_j()),
        ("loss", model.loss()),
        ("dL/da_j", model.dl_da_j()),
        ("da_j/dz_j", model.da_j_dz_j()),
        ("dz_j/dw_ij", model.dz_j_dw_ij()),
        ("dL/dw_ij", model.dl_dw_ij()),
        ("w_new", model.w_new()),
    ] {
        writeln!(out, "{name:<12} {value:.4}")?;
    }
    Ok(())
}
