use weatherman::{generate_summary, WeatherTable};

fn main() {
    let file = std::env::args().nth(1).expect("Missing filename");
    println!("opening {file}");

    let table = WeatherTable::load(&file).unwrap();

    print!("{}", generate_summary(&table).unwrap());
}
