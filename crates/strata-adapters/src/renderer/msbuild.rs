//! MSBuild project renderer.
//!
//! Turns one [`ProjectSpec`] into the files a `dotnet new` + manual clean-up
//! would leave behind: the `.csproj`, the layer's folder skeleton with
//! `.gitkeep` placeholders, and the few source files a project needs to be
//! useful (API entry point, EF Core context, sample test).
//!
//! It also reads project files back: the target framework and the project
//! references, which is all generation needs from files it did not write in
//! the current run.

use std::path::PathBuf;

use tracing::{debug, instrument};

use strata_core::{
    application::{ApplicationError, ProjectFileInfo, ports::ProjectRenderer},
    domain::{
        ApiStyle, DirectoryToCreate, FileToWrite, FsEntry, Layer, ProjectRole, ProjectSpec,
        SolutionConfiguration, SolutionPlan, TestKind, policy,
    },
    error::StrataResult,
};

const SDK: &str = "Microsoft.NET.Sdk";
const WEB_SDK: &str = "Microsoft.NET.Sdk.Web";
const PLACEHOLDER: &str = ".gitkeep";
const BUILD_PROPS: &str = "Directory.Build.props";
const XML_SPECIAL: [char; 5] = ['<', '>', '&', '"', '\''];

const SWASHBUCKLE: Package = Package::new("Swashbuckle.AspNetCore", "6.9.0");
const GRPC: Package = Package::new("Grpc.AspNetCore", "2.62.0");
const EF_CORE: [Package; 2] = [
    Package::new("Microsoft.EntityFrameworkCore", "9.0.0"),
    Package::new("Microsoft.EntityFrameworkCore.SqlServer", "9.0.0"),
];
const TEST_PACKAGES: [Package; 3] = [
    Package::new("Microsoft.NET.Test.Sdk", "17.11.1"),
    Package::new("xunit", "2.9.2"),
    Package::new("xunit.runner.visualstudio", "2.8.2"),
];

const CQRS_FOLDERS: [&str; 2] = ["UseCases/Commands", "UseCases/Queries"];
const DB_CONTEXT_DIR: &str = "Persistence/DbContext";

// ── Project file model ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Package {
    name: &'static str,
    version: &'static str,
}

impl Package {
    const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }
}

/// The handful of `.csproj` elements we generate.
#[derive(Debug, Clone)]
struct ProjectFile {
    sdk: &'static str,
    properties: Vec<(&'static str, String)>,
    packages: Vec<Package>,
    references: Vec<String>,
}

impl ProjectFile {
    fn new(sdk: &'static str, config: &SolutionConfiguration, root_namespace: &str) -> Self {
        Self {
            sdk,
            properties: vec![
                ("TargetFramework", config.target_framework().to_string()),
                ("ImplicitUsings", "enable".into()),
                ("Nullable", "enable".into()),
                ("RootNamespace", root_namespace.to_string()),
            ],
            packages: Vec::new(),
            references: Vec::new(),
        }
    }

    fn property(mut self, name: &'static str, value: &str) -> Self {
        // RootNamespace stays last
        let at = self.properties.len() - 1;
        self.properties.insert(at, (name, value.to_string()));
        self
    }

    fn packages(mut self, packages: impl IntoIterator<Item = Package>) -> Self {
        self.packages.extend(packages);
        self
    }

    fn references(mut self, references: &[String]) -> Self {
        self.references.extend(references.iter().cloned());
        self
    }

    fn render(&self) -> String {
        let mut xml = format!("<Project Sdk=\"{}\">\n\n  <PropertyGroup>\n", self.sdk);
        for (name, value) in &self.properties {
            xml.push_str(&format!("    <{name}>{value}</{name}>\n"));
        }
        xml.push_str("  </PropertyGroup>\n");

        if !self.packages.is_empty() {
            xml.push_str("\n  <ItemGroup>\n");
            for package in &self.packages {
                xml.push_str(&format!(
                    "    <PackageReference Include=\"{}\" Version=\"{}\" />\n",
                    package.name, package.version
                ));
            }
            xml.push_str("  </ItemGroup>\n");
        }

        if !self.references.is_empty() {
            xml.push_str("\n  <ItemGroup>\n");
            for reference in &self.references {
                xml.push_str(&format!("    <ProjectReference Include=\"{reference}\" />\n"));
            }
            xml.push_str("  </ItemGroup>\n");
        }

        xml.push_str("\n</Project>\n");
        xml
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Renders SDK-style C# projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsBuildRenderer;

impl MsBuildRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_layer(
        &self,
        config: &SolutionConfiguration,
        project: &ProjectSpec,
        layer: Layer,
        out: &mut Output,
    ) {
        let mut file = ProjectFile::new(SDK, config, project.name());

        match layer {
            Layer::Api => {
                file.sdk = WEB_SDK;
                file = file.packages([api_package(config.api_style())]);
                out.file("Program.cs", program_cs(config.api_style()));
            }
            Layer::Infrastructure if config.ef_core() => {
                file = file.packages(EF_CORE);
                out.file(
                    format!("{DB_CONTEXT_DIR}/ApplicationDbContext.cs"),
                    db_context_cs(project.name()),
                );
            }
            _ => {}
        }

        out.file(project.file_name(), file.references(project.references()).render());

        for folder in layer_folders(config, layer) {
            out.dir(&folder);
            out.file(format!("{folder}/{PLACEHOLDER}"), String::new());
        }
    }

    fn render_tests(
        &self,
        config: &SolutionConfiguration,
        project: &ProjectSpec,
        kind: TestKind,
        out: &mut Output,
    ) {
        let file = ProjectFile::new(SDK, config, project.name())
            .property("IsPackable", "false")
            .property("IsTestProject", "true")
            .packages(TEST_PACKAGES)
            .references(project.references());

        out.file(project.file_name(), file.render());
        out.file(
            format!("{}Test.cs", kind.as_str()),
            test_class_cs(project.name(), kind),
        );
    }
}

impl ProjectRenderer for MsBuildRenderer {
    #[instrument(skip_all, fields(project = project.name()))]
    fn render(&self, plan: &SolutionPlan, project: &ProjectSpec) -> StrataResult<Vec<FsEntry>> {
        if let Some(bad) = project.name().chars().find(|c| XML_SPECIAL.contains(c)) {
            return Err(ApplicationError::RenderingFailed {
                project: project.name().to_string(),
                reason: format!("'{bad}' cannot appear in a project name"),
            }
            .into());
        }

        let config = plan.config();
        let mut out = Output::new(project.directory());

        match project.role() {
            ProjectRole::Layer(layer) => self.render_layer(config, project, layer, &mut out),
            ProjectRole::Test(kind) => self.render_tests(config, project, kind, &mut out),
        }

        debug!(entries = out.entries.len(), "Rendered project files");
        Ok(out.entries)
    }

    fn render_shared(&self, plan: &SolutionPlan) -> StrataResult<Vec<FsEntry>> {
        Ok(vec![FsEntry::File(FileToWrite {
            path: PathBuf::from(BUILD_PROPS),
            content: build_props(plan.config()),
        })])
    }

    fn inspect(&self, project_file: &str) -> ProjectFileInfo {
        ProjectFileInfo {
            target_framework: element_text(project_file, "TargetFramework").map(str::to_string),
            references: attribute_values(project_file, "ProjectReference", "Include")
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Text of the first `<tag>...</tag>` element.
fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    Some(xml[start..end].trim())
}

/// `attribute` of every `<element ...>` start tag, in document order.
fn attribute_values<'a>(xml: &'a str, element: &str, attribute: &str) -> Vec<&'a str> {
    let open = format!("<{element} ");
    let key = format!("{attribute}=\"");
    xml.match_indices(&open)
        .filter_map(|(at, _)| {
            let tag = &xml[at..at + xml[at..].find('>')?];
            let start = tag.find(&key)? + key.len();
            let end = start + tag[start..].find('"')?;
            Some(&tag[start..end])
        })
        .collect()
}

/// Properties every project in the solution inherits.
fn build_props(config: &SolutionConfiguration) -> String {
    format!(
        "\
<Project>
  <PropertyGroup>
    <TargetFramework>{}</TargetFramework>
    <LangVersion>latest</LangVersion>
    <Nullable>enable</Nullable>
    <ImplicitUsings>enable</ImplicitUsings>
    <TreatWarningsAsErrors>false</TreatWarningsAsErrors>
  </PropertyGroup>
</Project>
",
        config.target_framework()
    )
}

fn api_package(style: ApiStyle) -> Package {
    match style {
        ApiStyle::WebApi | ApiStyle::MinimalApi => SWASHBUCKLE,
        ApiStyle::Grpc => GRPC,
    }
}

fn program_cs(style: ApiStyle) -> String {
    let body = match style {
        ApiStyle::WebApi => {
            "\
// Add services to the container
builder.Services.AddControllers();
builder.Services.AddEndpointsApiExplorer();
builder.Services.AddSwaggerGen();

var app = builder.Build();

// Configure the HTTP request pipeline
if (app.Environment.IsDevelopment())
{
    app.UseSwagger();
    app.UseSwaggerUI();
}

app.UseHttpsRedirection();
app.UseAuthorization();
app.MapControllers();
"
        }
        ApiStyle::MinimalApi => {
            "\
// Add services to the container
builder.Services.AddEndpointsApiExplorer();
builder.Services.AddSwaggerGen();

var app = builder.Build();

// Configure the HTTP request pipeline
if (app.Environment.IsDevelopment())
{
    app.UseSwagger();
    app.UseSwaggerUI();
}

app.UseHttpsRedirection();

app.MapGet(\"/\", () => \"Hello from Minimal API!\");
"
        }
        ApiStyle::Grpc => {
            "\
// Add services to the container
builder.Services.AddGrpc();
builder.Services.AddGrpcReflection();

var app = builder.Build();

// Register gRPC services here:
// app.MapGrpcService<YourService>();
app.MapGet(\"/\", () => \"Communication with gRPC endpoints must be made through a gRPC client.\");
"
        }
    };

    format!("var builder = WebApplication.CreateBuilder(args);\n\n{body}\napp.Run();\n")
}

fn db_context_cs(infrastructure_namespace: &str) -> String {
    format!(
        "\
using Microsoft.EntityFrameworkCore;

namespace {infrastructure_namespace}.Persistence.DbContext;

public class ApplicationDbContext : Microsoft.EntityFrameworkCore.DbContext
{{
    public ApplicationDbContext(Microsoft.EntityFrameworkCore.DbContextOptions<ApplicationDbContext> options)
        : base(options)
    {{
    }}

    protected override void OnModelCreating(Microsoft.EntityFrameworkCore.ModelBuilder modelBuilder)
    {{
        base.OnModelCreating(modelBuilder);
    }}
}}
"
    )
}

fn test_class_cs(test_namespace: &str, kind: TestKind) -> String {
    let class = format!("{}Test", kind.as_str());
    format!(
        "\
using Xunit;

namespace {test_namespace};

public class {class}
{{
    [Fact]
    public void SampleTest()
    {{
        Assert.True(true);
    }}
}}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use strata_core::domain::{
        DependencyPolicy, LayerGraph, ProjectStructure, SolutionConfigurationBuilder,
        entities::solution::HasName,
    };

    fn plan(config: SolutionConfiguration) -> SolutionPlan {
        let policy = DependencyPolicy::for_selection(config.layers());
        let graph = LayerGraph::from_policy(config.layers(), &policy, true);
        SolutionPlan::build(&config, &graph)
    }

    fn config() -> SolutionConfigurationBuilder<HasName> {
        SolutionConfiguration::builder()
            .solution_name("Shop")
            .base_namespace("Acme.Shop")
    }

    fn render(plan: &SolutionPlan, role: ProjectRole) -> Vec<FsEntry> {
        let project = plan.project(role).unwrap();
        MsBuildRenderer::new().render(plan, project).unwrap()
    }

    fn file<'a>(entries: &'a [FsEntry], path: &str) -> &'a str {
        entries
            .iter()
            .find_map(|e| match e {
                FsEntry::File(f) if f.path == PathBuf::from(path) => Some(f.content.as_str()),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no file {path}"))
    }

    fn has(entries: &[FsEntry], path: &str) -> bool {
        entries.iter().any(|e| e.path() == Path::new(path))
    }

    #[test]
    fn application_project_references_domain() {
        let plan = plan(config().layer(Layer::Application).build().unwrap());
        let entries = render(&plan, ProjectRole::Layer(Layer::Application));

        let csproj = file(
            &entries,
            "src/Acme.Shop.Application/Acme.Shop.Application.csproj",
        );
        assert!(csproj.starts_with("<Project Sdk=\"Microsoft.NET.Sdk\">"));
        assert!(csproj.contains("<TargetFramework>net9.0</TargetFramework>"));
        assert!(csproj.contains("<RootNamespace>Acme.Shop.Application</RootNamespace>"));
        assert!(csproj.contains(
            "<ProjectReference Include=\"../Acme.Shop.Domain/Acme.Shop.Domain.csproj\" />"
        ));
        assert!(!csproj.contains("PackageReference"));
        assert!(has(&entries, "src/Acme.Shop.Application/Interfaces/.gitkeep"));
        assert!(!has(&entries, "src/Acme.Shop.Application/UseCases/Commands"));
    }

    #[test]
    fn cqrs_adds_command_and_query_folders() {
        let plan = plan(config().layer(Layer::Application).cqrs(true).build().unwrap());
        let entries = render(&plan, ProjectRole::Layer(Layer::Application));

        assert!(has(&entries, "src/Acme.Shop.Application/UseCases/Commands/.gitkeep"));
        assert!(has(&entries, "src/Acme.Shop.Application/UseCases/Queries/.gitkeep"));
    }

    #[test]
    fn domain_project_has_no_references() {
        let plan = plan(config().build().unwrap());
        let entries = render(&plan, ProjectRole::Layer(Layer::Domain));

        let csproj = file(&entries, "src/Acme.Shop.Domain/Acme.Shop.Domain.csproj");
        assert!(!csproj.contains("ProjectReference"));
        assert!(has(&entries, "src/Acme.Shop.Domain/Entities/.gitkeep"));
    }

    #[test]
    fn grpc_api_uses_web_sdk_and_services_folder() {
        let plan = plan(
            config()
                .layers([Layer::Application, Layer::Api])
                .api_style(ApiStyle::Grpc)
                .build()
                .unwrap(),
        );
        let entries = render(&plan, ProjectRole::Layer(Layer::Api));

        let csproj = file(&entries, "src/Acme.Shop.API/Acme.Shop.API.csproj");
        assert!(csproj.starts_with("<Project Sdk=\"Microsoft.NET.Sdk.Web\">"));
        assert!(csproj.contains("Include=\"Grpc.AspNetCore\" Version=\"2.62.0\""));
        assert!(file(&entries, "src/Acme.Shop.API/Program.cs").contains("AddGrpc()"));
        assert!(has(&entries, "src/Acme.Shop.API/Services/.gitkeep"));
        assert!(!has(&entries, "src/Acme.Shop.API/Controllers/.gitkeep"));
    }

    #[test]
    fn minimal_api_program_maps_root() {
        let plan = plan(
            config()
                .layers([Layer::Application, Layer::Api])
                .api_style(ApiStyle::MinimalApi)
                .build()
                .unwrap(),
        );
        let entries = render(&plan, ProjectRole::Layer(Layer::Api));

        let program = file(&entries, "src/Acme.Shop.API/Program.cs");
        assert!(program.contains("Hello from Minimal API!"));
        assert!(program.ends_with("app.Run();\n"));
        assert!(
            file(&entries, "src/Acme.Shop.API/Acme.Shop.API.csproj")
                .contains("Swashbuckle.AspNetCore")
        );
    }

    #[test]
    fn ef_core_adds_packages_and_db_context() {
        let plan = plan(
            config()
                .layers([Layer::Application, Layer::Infrastructure])
                .ef_core(true)
                .build()
                .unwrap(),
        );
        let entries = render(&plan, ProjectRole::Layer(Layer::Infrastructure));

        let csproj = file(
            &entries,
            "src/Acme.Shop.Infrastructure/Acme.Shop.Infrastructure.csproj",
        );
        assert!(csproj.contains("Microsoft.EntityFrameworkCore.SqlServer"));
        let context = file(
            &entries,
            "src/Acme.Shop.Infrastructure/Persistence/DbContext/ApplicationDbContext.cs",
        );
        assert!(context.contains("namespace Acme.Shop.Infrastructure.Persistence.DbContext;"));
    }

    #[test]
    fn test_project_references_every_layer() {
        let plan = plan(
            config()
                .layers([Layer::Application, Layer::Infrastructure])
                .tests(true)
                .build()
                .unwrap(),
        );
        let entries = render(&plan, ProjectRole::Test(TestKind::Integration));

        let csproj = file(
            &entries,
            "tests/Acme.Shop.IntegrationTests/Acme.Shop.IntegrationTests.csproj",
        );
        assert!(csproj.contains("<IsTestProject>true</IsTestProject>"));
        assert!(csproj.contains("Include=\"xunit\" Version=\"2.9.2\""));
        for layer in ["Domain", "Application", "Infrastructure"] {
            assert!(csproj.contains(&format!(
                "Include=\"../../src/Acme.Shop.{layer}/Acme.Shop.{layer}.csproj\""
            )));
        }
        // RootNamespace is still the last property
        assert!(csproj.contains(
            "<IsTestProject>true</IsTestProject>\n    <RootNamespace>Acme.Shop.IntegrationTests</RootNamespace>"
        ));

        let class = file(
            &entries,
            "tests/Acme.Shop.IntegrationTests/IntegrationTest.cs",
        );
        assert!(class.contains("namespace Acme.Shop.IntegrationTests;"));
        assert!(class.contains("public class IntegrationTest"));
    }

    #[test]
    fn rendered_paths_are_unique_and_relative() {
        let plan = plan(
            config()
                .layers(Layer::ALL)
                .cqrs(true)
                .ef_core(true)
                .tests(true)
                .build()
                .unwrap(),
        );
        let mut structure = ProjectStructure::new("/out/Shop");
        for project in plan.projects() {
            structure.extend(MsBuildRenderer::new().render(&plan, project).unwrap());
        }
        assert!(structure.validate().is_ok());
    }

    #[test]
    fn shared_props_carry_the_target_framework() {
        let plan = plan(config().target_framework("net8.0").build().unwrap());
        let entries = MsBuildRenderer::new().render_shared(&plan).unwrap();

        let props = file(&entries, "Directory.Build.props");
        assert!(props.starts_with("<Project>"));
        assert!(props.contains("<TargetFramework>net8.0</TargetFramework>"));
        assert!(props.contains("<LangVersion>latest</LangVersion>"));
    }

    #[test]
    fn inspect_reads_back_a_rendered_project() {
        let plan = plan(
            config()
                .layers([Layer::SharedKernel, Layer::Application])
                .target_framework("net8.0")
                .build()
                .unwrap(),
        );
        let entries = render(&plan, ProjectRole::Layer(Layer::Application));
        let csproj = file(
            &entries,
            "src/Acme.Shop.Application/Acme.Shop.Application.csproj",
        );

        let info = MsBuildRenderer::new().inspect(csproj);
        assert_eq!(info.target_framework.as_deref(), Some("net8.0"));
        assert_eq!(
            info.references,
            [
                "../Acme.Shop.SharedKernel/Acme.Shop.SharedKernel.csproj",
                "../Acme.Shop.Domain/Acme.Shop.Domain.csproj",
            ]
        );
    }

    #[test]
    fn inspect_tolerates_hand_edited_files() {
        let text = "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    \
                    <TargetFramework> net7.0 </TargetFramework>\n  </PropertyGroup>\n  \
                    <ItemGroup>\n    <ProjectReference Include=\"..\\Core\\Core.csproj\">\n    \
                    </ProjectReference>\n  </ItemGroup>\n</Project>\n";

        let info = MsBuildRenderer::new().inspect(text);
        assert_eq!(info.target_framework.as_deref(), Some("net7.0"));
        assert_eq!(info.references, ["..\\Core\\Core.csproj"]);
        assert_eq!(MsBuildRenderer::new().inspect(""), ProjectFileInfo::default());
    }

    #[test]
    fn xml_special_characters_are_refused() {
        let plan = plan(
            SolutionConfiguration::builder()
                .solution_name("Shop")
                .base_namespace("Acme<Shop")
                .build()
                .unwrap(),
        );
        let domain = plan.project(ProjectRole::Layer(Layer::Domain)).unwrap();

        let err = MsBuildRenderer::new().render(&plan, domain).unwrap_err();
        assert!(err.to_string().contains("Rendering failed for Acme<Shop.Domain"));
    }
}
