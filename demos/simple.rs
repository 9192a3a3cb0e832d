use xtjson::{parse, parse_safe};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let data = r#"
        {
            // comments are allowed
            "user": {
                "name": "John Doe",
                "email": "john.doe@example.com",
                "roles": ("admin", "dev", "admin")
            },
            "quota": `5 * 1024`
        }
    "#;

    match parse(data).await {
        Ok(result) => {
            let json_output = result.to_json().unwrap();
            println!("Successfully parsed to JSON:\n{json_output}");
        }
        Err(e) => {
            eprintln!("Failed to parse: {:?}", miette::Report::new(e));
        }
    }

    // The safe entry point keeps the expression as text.
    if let Ok(result) = parse_safe(data).await {
        println!("Parsed safely:\n{result}");
    }
}
