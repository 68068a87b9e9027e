//! Minimal Maven layout so a fresh directory can host generated tests.

use std::fs;
use std::io;
use std::path::Path;

use crate::logger::{log, LogLevel};
use crate::scanner::SOURCE_ROOTS;

const POM_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <groupId>com.example</groupId>
    <artifactId>jtester-sandbox</artifactId>
    <version>1.0-SNAPSHOT</version>

    <properties>
        <maven.compiler.source>17</maven.compiler.source>
        <maven.compiler.target>17</maven.compiler.target>
        <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>
    </properties>

    <dependencies>
        <dependency>
            <groupId>org.junit.jupiter</groupId>
            <artifactId>junit-jupiter</artifactId>
            <version>5.10.2</version>
            <scope>test</scope>
        </dependency>
        <dependency>
            <groupId>org.mockito</groupId>
            <artifactId>mockito-core</artifactId>
            <version>5.11.0</version>
            <scope>test</scope>
        </dependency>
        <dependency>
            <groupId>org.mockito</groupId>
            <artifactId>mockito-junit-jupiter</artifactId>
            <version>5.11.0</version>
            <scope>test</scope>
        </dependency>
    </dependencies>

    <build>
        <plugins>
            <plugin>
                <groupId>org.apache.maven.plugins</groupId>
                <artifactId>maven-surefire-plugin</artifactId>
                <version>3.2.5</version>
                <configuration>
                    <useModulePath>false</useModulePath>
                </configuration>
            </plugin>
        </plugins>
    </build>
</project>
"#;

/// Create `pom.xml` and the source roots under `root`.
///
/// An existing `pom.xml` is left alone unless `force` is set. Returns whether
/// the pom was written.
pub fn init_project(root: &Path, force: bool) -> io::Result<bool> {
    for dir in SOURCE_ROOTS {
        fs::create_dir_all(root.join(dir))?;
    }

    let pom = root.join("pom.xml");
    if pom.exists() && !force {
        log(
            LogLevel::Warn,
            format!("{} already exists, leaving it untouched", pom.display()),
        );
        return Ok(false);
    }

    fs::write(&pom, POM_TEMPLATE)?;
    log(LogLevel::Success, format!("Wrote {}", pom.display()));
    Ok(true)
}
