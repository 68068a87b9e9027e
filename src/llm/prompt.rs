use sha2::{Digest, Sha256};

const PROMPT_ABI_VERSION: &str = "v1-junit-repair";

#[derive(Debug, Clone)]
pub struct LlmPrompt {
    pub system: String,
    pub user: String,
}

impl LlmPrompt {
    /// Stable content hash, recorded per attempt in the run report.
    pub fn hash(&self) -> String {
        let mut h = Sha256::new();
        h.update(PROMPT_ABI_VERSION.as_bytes());
        h.update(self.system.as_bytes());
        h.update(self.user.as_bytes());
        hex::encode(h.finalize())
    }
}

/* ============================================================
   System prompts (stable, reused)
   ============================================================ */

fn generator_system() -> String {
    r#"
You are an expert Java QA Automation Engineer.
Your goal is to write robust JUnit 5 tests.
OUTPUT ONLY JAVA CODE. No conversational text.
"#
    .trim()
    .to_string()
}

fn analyst_system() -> String {
    r#"
You are a Senior Java Developer reviewing a failed test.
Your goal is to diagnose the root cause of the failure based on the logs.
Be concise and technical. Do not write code yet.
"#
    .trim()
    .to_string()
}

/* ============================================================
   User prompts
   ============================================================ */

fn section(out: &mut String, title: &str, lang: &str, body: &str) {
    out.push_str(title);
    out.push_str(":\n```");
    out.push_str(lang);
    out.push('\n');
    out.push_str(body.trim_end());
    out.push_str("\n```\n\n");
}

pub fn generation_prompt(class_name: &str, source: &str, context: &str) -> LlmPrompt {
    let mut user = format!("Write a unit test class for: {class_name}\n\n");

    section(&mut user, "SOURCE CODE", "java", source);
    section(&mut user, "CONTEXT (Dependencies)", "text", context);

    user.push_str(
        "Remember:\n\
         1. Use JUnit 5 and Mockito.\n\
         2. Package name must match the source.\n\
         3. Output ONLY the Java code block.\n",
    );

    LlmPrompt {
        system: generator_system(),
        user,
    }
}

pub fn diagnosis_prompt(
    class_name: &str,
    source: &str,
    test_code: &str,
    error_log: &str,
    context: &str,
) -> LlmPrompt {
    let mut user = format!(
        "The test for {class_name} failed. Analyze the error log and explain the fix.\n\n"
    );

    section(&mut user, "SOURCE CODE", "java", source);
    section(&mut user, "FAILED TEST CODE", "java", test_code);
    section(&mut user, "ERROR LOG", "text", error_log);
    section(&mut user, "CONTEXT (Dependencies)", "text", context);

    user.push_str(
        "INSTRUCTIONS:\n\
         1. Identify the specific compilation error or assertion failure.\n\
         2. Explain specifically what needs to change in the test code \
         (e.g., \"Add import for X\", \"Change mock return type to Y\").\n\
         3. Do NOT output the full code yet. Just the analysis.\n",
    );

    LlmPrompt {
        system: analyst_system(),
        user,
    }
}

pub fn fix_prompt(
    class_name: &str,
    source: &str,
    test_code: &str,
    error_log: &str,
    diagnosis: &str,
    context: &str,
) -> LlmPrompt {
    let mut user = String::from("Fix the failed Java test based on your analysis.\n\n");

    user.push_str(&format!("YOUR ANALYSIS:\n\"{}\"\n\n", diagnosis.trim()));
    section(&mut user, "ERROR LOG", "text", error_log);
    section(&mut user, "FAILED TEST CODE", "java", test_code);
    section(&mut user, "SOURCE CODE", "java", source);
    section(&mut user, "CONTEXT (Dependencies)", "text", context);

    user.push_str(&format!("Output the FULL corrected {class_name}Test.java class.\n"));

    LlmPrompt {
        system: generator_system(),
        user,
    }
}
