use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    comfypack completions bash > ~/.bash_completion.d/comfypack\n\n\
                  Generate zsh completions:\n    comfypack completions zsh > ~/.zfunc/_comfypack\n\n\
                  Generate fish completions:\n    comfypack completions fish > ~/.config/fish/completions/comfypack.fish\n\n\
                  Generate PowerShell completions:\n    comfypack completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
