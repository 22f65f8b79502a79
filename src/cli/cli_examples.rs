use super::cli_main::get_user_input;
use crate::Examples::kinetics_examples::kin_examples;
use std::io::{self, Write};

pub fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. Rate coefficients of a single reaction");
        println!("2. User laws in the registry");
        println!("3. Irreversible reaction system");
        println!("4. Reversible reaction system with NASA data");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        let _ = io::stdout().flush();

        let Some(choice) = get_user_input() else {
            break;
        };
        let task = match choice.trim() {
            "1" => 0,
            "2" => 1,
            "3" => 2,
            "4" => 3,
            "0" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                continue;
            }
        };
        if let Err(e) = kin_examples(task) {
            println!("Example failed: {}", e);
        }
    }
}
