//! Benchmarks for vmresolve core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vmresolve::core::catalog::ImageCatalog;
use vmresolve::core::parser::parse_vm_request;
use vmresolve::core::pipeline::{process_vm_create, ResolveContext};
use vmresolve::core::reference::parse_reference;
use vmresolve::credentials::prompt::NoPrompt;
use vmresolve::credentials::LocalKeyMaterial;
use vmresolve::transport::inventory::{Inventory, InventoryResource};
use vmresolve::transport::ResourceKind;

const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

fn bench_parse_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_reference");
    let inputs = [
        ("bare", "web-nsg".to_string()),
        (
            "full",
            format!(
                "/subscriptions/{}/resourceGroups/rg/providers/Microsoft.Network/networkSecurityGroups/web-nsg",
                SUBSCRIPTION
            ),
        ),
        (
            "child",
            format!(
                "/subscriptions/{}/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/v/subnets/s",
                SUBSCRIPTION
            ),
        ),
    ];
    for (name, input) in &inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| black_box(parse_reference(black_box(input))));
        });
    }
    group.finish();
}

fn bench_request_parse(c: &mut Criterion) {
    let yaml = r#"
resource_group: web
image: Canonical:UbuntuServer:16.04-LTS:latest
admin_username: ops
vnet_name: web-vnet
subnet: frontend
nsg: ""
public_ip_address: web-ip
nics: [nic-a, nic-b]
ssh_key_value: ssh-rsa AAAAB3NzaC1yc2EAAAADAQAB ops
"#;
    c.bench_function("parse_vm_request", |b| {
        b.iter(|| black_box(parse_vm_request(black_box(yaml))));
    });
}

fn inventory(vnets: usize) -> Inventory {
    let mut inv = Inventory::new().with_group("web", "westus");
    for i in 0..vnets {
        let location = if i + 1 == vnets { "westus" } else { "eastus" };
        inv = inv.with_resource(
            "web",
            InventoryResource::new(ResourceKind::VirtualNetwork, &format!("vnet-{i:03}"), location)
                .with_subnets(&["GatewaySubnet", "default"]),
        );
    }
    inv.with_resource(
        "web",
        InventoryResource::new(ResourceKind::StorageAccount, "premsa", "westus")
            .with_sku_tier("Premium"),
    )
}

fn bench_vm_pipeline(c: &mut Criterion) {
    let catalog = ImageCatalog::builtin();
    let keys = LocalKeyMaterial::default();
    let req = parse_vm_request(
        "resource_group: web\nimage: UbuntuLTS\nadmin_username: ops\n\
         ssh_key_value: ssh-rsa AAAAB3NzaC1yc2EAAAADAQAB ops\n",
    )
    .unwrap();

    let mut group = c.benchmark_group("vm_pipeline");
    for n in [1, 10, 100] {
        let inv = inventory(n);
        let ctx = ResolveContext {
            subscription: SUBSCRIPTION.to_string(),
            query: &inv,
            catalog: &catalog,
            keys: &keys,
            prompter: &NoPrompt,
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &req, |b, req| {
            b.iter(|| black_box(process_vm_create(req.clone(), &ctx).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_reference,
    bench_request_parse,
    bench_vm_pipeline
);
criterion_main!(benches);
