use std::time::Instant;

use chainrule::text::render;
use chainrule::{Command, ScalarModel, Walkthrough, AUTOPLAY_DELAY, STEPS};

fn main() {
    let model = ScalarModel::reference();
    println!("dL/da_j    = {:.4}", model.dl_da_j()); // -0.2100
    println!("da_j/dz_j  = {:.4}", model.da_j_dz_j()); // 0.2139
    println!("dz_j/dw_ij = {:.4}", model.dz_j_dw_ij()); // 0.8000
    println!("dL/dw_ij   = {:.4}", model.dl_dw_ij()); // -0.0359
    println!("w_new      = {:.4}", model.w_new()); // 0.5180
    println!();

    // walk every step by hand and print the frame
    let mut walkthrough = Walkthrough::new(model, AUTOPLAY_DELAY);
    print!("{}", render(walkthrough.snapshot()));
    for _ in 1..STEPS.len() {
        walkthrough.apply(Command::Forward, Instant::now());
        println!();
        print!("{}", render(walkthrough.snapshot()));
    }
}
