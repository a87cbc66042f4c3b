use cmdsh::{Interpreter, builtin};

fn main() -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    builtin::write_listing(&mut stdout)?;

    let mut interpreter = Interpreter::new();
    interpreter.repl()
}
