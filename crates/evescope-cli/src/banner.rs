pub fn print_banner() {
    println!(
        "  {} {} -- eve.json triage",
        console::style("evescope").cyan().bold(),
        env!("CARGO_PKG_VERSION"),
    );
    println!();
}
