//! `igor plugins` -- list the built-in plugin identifiers.

use igor_core::PluginRegistry;

pub fn run() {
    print!("{}", render(&PluginRegistry::builtin()));
}

fn render(registry: &PluginRegistry) -> String {
    format!(
        "channels: {}\nreactors: {}\n",
        registry.channel_names().join(", "),
        registry.reactor_names().join(", ")
    )
}
