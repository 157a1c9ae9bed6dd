//! End-to-end generation through the real codec and renderer, on an
//! in-memory filesystem.

use std::path::{Path, PathBuf};

use strata_adapters::{MemoryFilesystem, MsBuildRenderer, SlnCodec};
use strata_core::{
    application::{
        AddTestsOptions, GenerateOptions, GenerationService,
        ports::{Filesystem, ManifestCodec},
    },
    domain::{ApiStyle, DomainError, Layer, SolutionConfiguration, TestKind, Violation},
    error::StrataError,
};

fn service(fs: &MemoryFilesystem) -> GenerationService {
    GenerationService::new(
        Box::new(fs.clone()),
        Box::new(SlnCodec::new()),
        Box::new(MsBuildRenderer::new()),
    )
}

fn shop(layers: &[Layer], tests: bool) -> SolutionConfiguration {
    SolutionConfiguration::builder()
        .solution_name("Shop")
        .layers(layers.iter().copied())
        .api_style(ApiStyle::WebApi)
        .tests(tests)
        .build()
        .unwrap()
}

fn out() -> PathBuf {
    PathBuf::from("/out")
}

fn sln(fs: &MemoryFilesystem) -> String {
    fs.read_file(Path::new("/out/Shop/Shop.sln")).unwrap()
}

#[test]
fn generates_a_full_solution() {
    let fs = MemoryFilesystem::new();
    let report = service(&fs)
        .generate(
            &shop(&Layer::ALL, true),
            &out(),
            GenerateOptions::default(),
        )
        .unwrap();

    assert_eq!(report.solution_file, PathBuf::from("/out/Shop/Shop.sln"));
    assert_eq!(report.projects_added.len(), 7);
    assert_eq!(report.synthesis.entries_added, 9);

    let document = SlnCodec::new().parse(&sln(&fs)).unwrap();
    assert_eq!(document.projects().count(), 7);
    assert_eq!(document.nesting().len(), 7);

    let api = fs
        .read_file(Path::new("/out/Shop/src/Shop.API/Shop.API.csproj"))
        .unwrap();
    assert!(api.contains("../Shop.Application/Shop.Application.csproj"));
    assert!(fs.exists(Path::new("/out/Shop/tests/Shop.UnitTests/UnitTest.cs")));
    assert!(fs.exists(Path::new(
        "/out/Shop/src/Shop.SharedKernel/Primitives/.gitkeep"
    )));
}

#[test]
fn violation_writes_nothing() {
    let fs = MemoryFilesystem::new();
    let options = GenerateOptions {
        extra_edges: vec![(Layer::Domain, Layer::Application)],
        ..GenerateOptions::default()
    };

    let err = service(&fs)
        .generate(&shop(&[Layer::Application], false), &out(), options)
        .unwrap_err();

    let violations = err.violations().unwrap();
    assert!(violations.contains(&Violation::InvalidDependency {
        from: Layer::Domain,
        to: Layer::Application,
    }));
    assert!(fs.is_empty());
}

#[test]
fn existing_solution_is_refused_without_force() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    let config = shop(&[Layer::Application], false);
    svc.generate(&config, &out(), GenerateOptions::default())
        .unwrap();
    let before = sln(&fs);

    let err = svc
        .generate(&config, &out(), GenerateOptions::default())
        .unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(sln(&fs), before);
}

#[test]
fn forced_rerun_is_a_noop() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    let config = shop(&Layer::ALL, true);
    svc.generate(&config, &out(), GenerateOptions::default())
        .unwrap();
    let before = sln(&fs);
    let files = fs.list_files();

    let report = svc
        .generate(
            &config,
            &out(),
            GenerateOptions {
                force: true,
                ..GenerateOptions::default()
            },
        )
        .unwrap();

    assert!(report.is_noop());
    assert!(report.synthesis.is_noop());
    assert_eq!(report.projects_existing.len(), 7);
    assert_eq!(sln(&fs), before);
    assert_eq!(fs.list_files(), files);
}

#[test]
fn forced_rerun_adds_only_new_layers() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    svc.generate(
        &shop(&[Layer::Application], false),
        &out(),
        GenerateOptions::default(),
    )
    .unwrap();
    let codec = SlnCodec::new();
    let first = codec.parse(&sln(&fs)).unwrap();

    let report = svc
        .generate(
            &shop(&[Layer::Application, Layer::Infrastructure], false),
            &out(),
            GenerateOptions {
                force: true,
                ..GenerateOptions::default()
            },
        )
        .unwrap();

    assert_eq!(report.projects_added, ["Shop.Infrastructure"]);
    let second = codec.parse(&sln(&fs)).unwrap();
    for entry in first.entries() {
        assert_eq!(second.entry(entry.id()), Some(entry));
    }
    assert_eq!(second.entries().len(), first.entries().len() + 1);
}

#[test]
fn forced_rerun_restores_a_missing_solution_axis() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    let config = shop(&[Layer::Domain], false);
    svc.generate(&config, &out(), GenerateOptions::default())
        .unwrap();

    let stripped = sln(&fs).replace("\t\tRelease|Any CPU = Release|Any CPU\r\n", "");
    assert_ne!(stripped, sln(&fs));
    fs.write_file(Path::new("/out/Shop/Shop.sln"), &stripped)
        .unwrap();

    let report = svc
        .generate(
            &config,
            &out(),
            GenerateOptions {
                force: true,
                ..GenerateOptions::default()
            },
        )
        .unwrap();

    assert_eq!(report.synthesis.axes_added, 1);
    assert_eq!(report.paths, [PathBuf::from("Shop.sln")]);
    assert!(sln(&fs).contains("\t\tRelease|Any CPU = Release|Any CPU\r\n"));
}

#[test]
fn references_into_existing_projects_are_reported_missing() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    svc.generate(
        &shop(&[Layer::Application], false),
        &out(),
        GenerateOptions::default(),
    )
    .unwrap();

    let report = svc
        .generate(
            &shop(&[Layer::SharedKernel, Layer::Application], false),
            &out(),
            GenerateOptions {
                force: true,
                ..GenerateOptions::default()
            },
        )
        .unwrap();

    assert_eq!(report.projects_added, ["Shop.SharedKernel"]);
    assert!(report.references.is_empty());
    assert_eq!(
        report.references_missing,
        [
            (Layer::Domain, Layer::SharedKernel),
            (Layer::Application, Layer::SharedKernel),
        ]
    );
    let domain = fs
        .read_file(Path::new("/out/Shop/src/Shop.Domain/Shop.Domain.csproj"))
        .unwrap();
    assert!(!domain.contains("Shop.SharedKernel.csproj"));
}

#[test]
fn fresh_solution_reports_every_reference_written() {
    let fs = MemoryFilesystem::new();
    let report = service(&fs)
        .generate(
            &shop(&[Layer::SharedKernel, Layer::Application], false),
            &out(),
            GenerateOptions::default(),
        )
        .unwrap();

    assert_eq!(report.references.len(), 3);
    assert!(report.references_missing.is_empty());
}

#[test]
fn build_props_is_written_once_and_then_kept() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    let config = shop(&[Layer::Application], false);
    let report = svc
        .generate(&config, &out(), GenerateOptions::default())
        .unwrap();

    assert!(report.paths.contains(&PathBuf::from("Directory.Build.props")));
    let props_path = Path::new("/out/Shop/Directory.Build.props");
    assert!(fs.read_file(props_path).unwrap().contains("<TargetFramework>net9.0</TargetFramework>"));

    fs.write_file(props_path, "<Project />\n").unwrap();
    let rerun = svc
        .generate(
            &config,
            &out(),
            GenerateOptions {
                force: true,
                ..GenerateOptions::default()
            },
        )
        .unwrap();

    assert!(rerun.is_noop());
    assert_eq!(fs.read_file(props_path).unwrap(), "<Project />\n");
}

#[test]
fn dry_run_reports_without_writing() {
    let fs = MemoryFilesystem::new();
    let report = service(&fs)
        .generate(
            &shop(&[Layer::Application], false),
            &out(),
            GenerateOptions {
                dry_run: true,
                ..GenerateOptions::default()
            },
        )
        .unwrap();

    assert!(report.dry_run);
    assert!(report.paths.contains(&PathBuf::from("Shop.sln")));
    assert!(fs.is_empty());
}

#[test]
fn failed_write_rolls_back_a_fresh_solution() {
    let fs = MemoryFilesystem::new();
    fs.fail_writes_to("/out/Shop/Shop.sln");

    let result = service(&fs).generate(
        &shop(&[Layer::Application], false),
        &out(),
        GenerateOptions::default(),
    );

    assert!(result.is_err());
    assert!(!fs.exists(Path::new("/out/Shop")));
    assert!(fs.list_files().is_empty());
}

#[test]
fn add_tests_adds_exactly_the_missing_projects() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    let config = SolutionConfiguration::builder()
        .solution_name("Shop")
        .target_framework("net8.0")
        .layers([Layer::Application, Layer::Infrastructure])
        .build()
        .unwrap();
    svc.generate(&config, &out(), GenerateOptions::default())
        .unwrap();
    let solution = Path::new("/out/Shop/Shop.sln");

    let first = svc
        .add_test_projects(solution, &[TestKind::Unit], AddTestsOptions::default())
        .unwrap();
    assert_eq!(first.projects_added, ["Shop.UnitTests"]);
    assert_eq!(first.synthesis.entries_added, 2); // tests folder + project

    let unit_csproj = fs
        .read_file(Path::new(
            "/out/Shop/tests/Shop.UnitTests/Shop.UnitTests.csproj",
        ))
        .unwrap();
    assert!(unit_csproj.contains("<TargetFramework>net8.0</TargetFramework>"));
    assert!(unit_csproj.contains("../../src/Shop.Infrastructure/Shop.Infrastructure.csproj"));

    let codec = SlnCodec::new();
    let with_unit = codec.parse(&sln(&fs)).unwrap();

    let second = svc
        .add_test_projects(
            solution,
            &[TestKind::Unit, TestKind::Integration],
            AddTestsOptions::default(),
        )
        .unwrap();
    assert_eq!(second.projects_added, ["Shop.IntegrationTests"]);
    assert_eq!(second.projects_existing, ["Shop.UnitTests"]);
    assert_eq!(second.synthesis.entries_added, 1);
    assert_eq!(second.synthesis.nestings_added, 1);
    assert_eq!(second.synthesis.config_lines_added, 4);

    let with_both = codec.parse(&sln(&fs)).unwrap();
    for entry in with_unit.entries() {
        assert_eq!(with_both.entry(entry.id()), Some(entry));
    }

    let third = svc
        .add_test_projects(
            solution,
            &[TestKind::Integration],
            AddTestsOptions::default(),
        )
        .unwrap();
    assert!(third.is_noop());
}

#[test]
fn add_tests_without_solution_is_not_found() {
    let fs = MemoryFilesystem::new();
    let err = service(&fs)
        .add_test_projects(
            Path::new("/nowhere/Shop.sln"),
            &[TestKind::Unit],
            AddTestsOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(
        err.category(),
        strata_core::error::ErrorCategory::NotFound
    ));
}

#[test]
fn add_tests_refuses_a_solution_without_global() {
    let fs = MemoryFilesystem::new();
    let svc = service(&fs);
    svc.generate(
        &shop(&[Layer::Application], false),
        &out(),
        GenerateOptions::default(),
    )
    .unwrap();

    let truncated = sln(&fs)
        .split("Global\r\n")
        .next()
        .unwrap()
        .to_string();
    fs.write_file(Path::new("/out/Shop/Shop.sln"), &truncated)
        .unwrap();

    let err = svc
        .add_test_projects(
            Path::new("/out/Shop/Shop.sln"),
            &[TestKind::Unit],
            AddTestsOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        StrataError::Domain(DomainError::MalformedDocument { .. })
    ));
    assert_eq!(sln(&fs), truncated);
}
